use super::{load_pipeline_input, resolve_engine_config};
use crate::cli::{configure_thread_pool, InputArgs};
use crate::config::EngineConfig;
use crate::io::{create_writer, OutputFormat};
use crate::observability::{set_phase, AnalysisPhase};
use crate::pipeline::{run_pipeline, PipelineOptions};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub struct AnalyzeConfig {
    pub input: InputArgs,
    pub as_of: Option<NaiveDate>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
}

/// CLI format, else the configured default, else terminal.
fn resolve_format(requested: Option<OutputFormat>, config: &EngineConfig) -> OutputFormat {
    if let Some(format) = requested {
        return format;
    }
    config
        .output
        .as_ref()
        .and_then(|o| o.default_format.as_deref())
        .and_then(|name| match name.parse() {
            Ok(format) => Some(format),
            Err(e) => {
                tracing::warn!("{e} in configuration; using terminal output");
                None
            }
        })
        .unwrap_or(OutputFormat::Terminal)
}

pub fn handle_analyze(config: AnalyzeConfig) -> Result<()> {
    let engine_config = resolve_engine_config(&config.input)?;
    let input = load_pipeline_input(&config.input)?;

    configure_thread_pool(config.input.jobs);
    let options = PipelineOptions {
        as_of: config.as_of,
        parallel: config.input.jobs != 1,
    };
    let report = run_pipeline(input, &engine_config, options);

    let _phase = set_phase(AnalysisPhase::OutputGeneration);
    let format = resolve_format(config.format, &engine_config);
    let sink: Box<dyn Write> = match &config.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    create_writer(format, sink).write_report(&report)?;

    if let Some(path) = &config.output {
        tracing::info!("wrote report to {}", path.display());
    }
    Ok(())
}
