use anyhow::Result;
use clap::Parser;
use maude_risk::cli::{init_logging, Cli, Commands};
use maude_risk::commands::{self, AnalyzeConfig, BacktestConfig};
use maude_risk::observability::install_panic_hook;

fn main() -> Result<()> {
    install_panic_hook();
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    match cli.command {
        Commands::Analyze {
            input,
            as_of,
            format,
            output,
        } => commands::handle_analyze(AnalyzeConfig {
            input,
            as_of,
            format: format.map(Into::into),
            output,
        }),
        Commands::Backtest {
            input,
            threshold_tier,
            format,
        } => commands::handle_backtest(BacktestConfig {
            input,
            threshold_tier: threshold_tier.map(Into::into),
            format: format.into(),
        }),
        Commands::Init { force } => commands::init::init_config(force),
    }
}
