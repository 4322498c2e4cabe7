//! Command-line interface
//!
//! - Argument parsing (`Cli`, `Commands`)
//! - Runtime setup: logging and the rayon pool (`setup`)

pub mod setup;

use crate::config::PresetLevel;
use crate::io::OutputFormat as WriterFormat;
use crate::scoring::RiskTier;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub use setup::{configure_thread_pool, init_logging};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThresholdPreset {
    /// Lower thresholds: flag devices earlier
    Strict,
    /// Canonical thresholds (default)
    Balanced,
    /// Higher thresholds: flag only pronounced escalation
    Lenient,
}

impl From<ThresholdPreset> for PresetLevel {
    fn from(preset: ThresholdPreset) -> Self {
        match preset {
            ThresholdPreset::Strict => PresetLevel::Strict,
            ThresholdPreset::Balanced => PresetLevel::Balanced,
            ThresholdPreset::Lenient => PresetLevel::Lenient,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

impl From<OutputFormat> for WriterFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => WriterFormat::Json,
            OutputFormat::Markdown => WriterFormat::Markdown,
            OutputFormat::Terminal => WriterFormat::Terminal,
        }
    }
}

/// Tier a device must reach to count as flagged when backtesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    Moderate,
    High,
    Critical,
}

impl From<TierArg> for RiskTier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Moderate => RiskTier::Moderate,
            TierArg::High => RiskTier::High,
            TierArg::Critical => RiskTier::Critical,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "maude-risk")]
#[command(about = "Adverse-event escalation and litigation-risk scoring for medical devices", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Inputs shared by `analyze` and `backtest`.
#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Adverse-event reports: JSON array, openFDA response object or JSON lines
    #[arg(short, long)]
    pub reports: PathBuf,

    /// Litigation milestones (JSON array)
    #[arg(short, long)]
    pub milestones: Option<PathBuf>,

    /// Known devices with alias search terms (JSON array)
    #[arg(short, long)]
    pub devices: Option<PathBuf>,

    /// Device for reports that do not name one
    #[arg(long = "device")]
    pub default_device: Option<String>,

    /// Configuration file (defaults to .maude-risk.toml found upward from the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Analysis window size in months
    #[arg(short, long)]
    pub window: Option<usize>,

    /// Threshold preset, applied over the configuration file
    #[arg(long = "threshold-preset", value_enum)]
    pub threshold_preset: Option<ThresholdPreset>,

    /// Number of parallel jobs (0 = all cores, 1 = sequential)
    #[arg(short = 'j', long = "jobs", default_value = "0", env = "MAUDE_RISK_JOBS")]
    pub jobs: usize,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score every device and correlate against milestones
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Assessment date (YYYY-MM-DD); defaults to the end of the latest report month
        #[arg(long = "as-of")]
        as_of: Option<NaiveDate>,

        /// Output format (defaults to the configured format, then terminal)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Measure how early the score flagged devices relative to first filings
    Backtest {
        #[command(flatten)]
        input: InputArgs,

        /// Tier a device must reach to count as flagged
        #[arg(long = "threshold-tier", value_enum)]
        threshold_tier: Option<TierArg>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
