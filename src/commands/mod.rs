//! CLI command implementations.
//!
//! - **analyze**: score every device and write a report
//! - **backtest**: compare first flags with first filings across devices
//! - **init**: write a default configuration file

pub mod analyze;
pub mod backtest;
pub mod init;

pub use analyze::{handle_analyze, AnalyzeConfig};
pub use backtest::{handle_backtest, BacktestConfig};

use crate::cli::InputArgs;
use crate::config::{load_config, load_config_from, validate_config_result, EngineConfig, PresetLevel};
use crate::core::{DeviceId, DeviceRegistry};
use crate::io::{load_devices, load_milestones, load_reports};
use crate::observability::{set_phase, AnalysisPhase};
use crate::pipeline::PipelineInput;
use anyhow::{Context, Result};

/// Resolve the engine configuration: file, then preset, then CLI overrides.
pub fn resolve_engine_config(args: &InputArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => load_config_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => load_config(),
    };
    if let Some(preset) = args.threshold_preset {
        config = PresetLevel::from(preset).apply(config);
    }
    if let Some(size) = args.window {
        config.window.size = size;
    }
    validate_config_result(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Read reports, milestones and devices named by the CLI.
pub fn load_pipeline_input(args: &InputArgs) -> Result<PipelineInput> {
    let _phase = set_phase(AnalysisPhase::InputLoading);

    let reports = load_reports(&args.reports).context("Failed to load reports")?;
    let milestones = match &args.milestones {
        Some(path) => load_milestones(path).context("Failed to load milestones")?,
        None => Vec::new(),
    };
    let registry = match &args.devices {
        Some(path) => DeviceRegistry::from_devices(
            load_devices(path).context("Failed to load devices")?,
        ),
        None => DeviceRegistry::new(),
    };
    tracing::info!(
        reports = reports.len(),
        milestones = milestones.len(),
        devices = registry.len(),
        "loaded inputs"
    );

    Ok(PipelineInput {
        reports,
        milestones,
        registry,
        default_device: args.default_device.as_deref().map(DeviceId::new),
    })
}
