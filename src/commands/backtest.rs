use super::{load_pipeline_input, resolve_engine_config};
use crate::cli::{configure_thread_pool, InputArgs};
use crate::io::OutputFormat;
use crate::io::output::lead_time_text;
use crate::pipeline::{run_pipeline, PipelineOptions};
use crate::scoring::RiskTier;
use crate::timeline::{BacktestSummary, TimelineCorrelation};
use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde::Serialize;
use std::io::Write;

pub struct BacktestConfig {
    pub input: InputArgs,
    pub threshold_tier: Option<RiskTier>,
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct BacktestReport {
    pub threshold: RiskTier,
    pub devices: Vec<TimelineCorrelation>,
    pub summary: BacktestSummary,
}

pub fn handle_backtest(config: BacktestConfig) -> Result<()> {
    let mut engine_config = resolve_engine_config(&config.input)?;
    if let Some(tier) = config.threshold_tier {
        engine_config.timeline.threshold_tier = tier;
    }
    let input = load_pipeline_input(&config.input)?;

    configure_thread_pool(config.input.jobs);
    let options = PipelineOptions {
        as_of: None,
        parallel: config.input.jobs != 1,
    };
    let analysis = run_pipeline(input, &engine_config, options);
    let report = BacktestReport {
        threshold: engine_config.timeline.threshold_tier,
        devices: analysis.devices.into_iter().map(|d| d.timeline).collect(),
        summary: analysis.backtest,
    };

    let mut out = std::io::stdout().lock();
    match config.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
        OutputFormat::Markdown => render_backtest_markdown(&mut out, &report)?,
        OutputFormat::Terminal => render_backtest(&mut out, &report)?,
    }
    out.flush()?;
    Ok(())
}

fn flag_month(device: &TimelineCorrelation) -> String {
    device
        .first_flag
        .as_ref()
        .map_or_else(|| "-".to_string(), |f| f.month.to_string())
}

fn filing_date(device: &TimelineCorrelation) -> String {
    device
        .first_filing
        .map_or_else(|| "-".to_string(), |d| d.to_string())
}

pub fn render_backtest_markdown(out: &mut impl Write, report: &BacktestReport) -> Result<()> {
    writeln!(out, "# Backtest at threshold {}", report.threshold.label())?;
    writeln!(out)?;
    writeln!(out, "| Device | First flag | First filing | Lead time | Timing |")?;
    writeln!(out, "|--------|------------|--------------|-----------|--------|")?;
    for device in &report.devices {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            device.device,
            flag_month(device),
            filing_date(device),
            lead_time_text(device),
            device.timing.label()
        )?;
    }
    writeln!(out)?;

    let summary = &report.summary;
    writeln!(out, "## Summary")?;
    writeln!(out)?;
    writeln!(out, "- Flagged before filing: {}", summary.predictive)?;
    writeln!(out, "- Flagged on/after filing: {}", summary.reactive)?;
    writeln!(out, "- Never flagged: {}", summary.not_flagged)?;
    writeln!(out, "- No filing date: {}", summary.no_filing)?;
    if let Some(rate) = summary.hit_rate() {
        writeln!(out, "- Hit rate: {:.0}%", rate * 100.0)?;
    }
    if let Some(mean) = summary.mean_predictive_lead_days {
        writeln!(out, "- Mean predictive lead time: {mean:.0} days")?;
    }
    Ok(())
}

pub fn render_backtest(out: &mut impl Write, report: &BacktestReport) -> Result<()> {
    writeln!(
        out,
        "{} {}",
        "Backtest at threshold".bold(),
        report.threshold.label().bold()
    )?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Device",
        "First flag",
        "First filing",
        "Lead time",
        "Timing",
    ]);
    for device in &report.devices {
        table.add_row(vec![
            device.device.to_string(),
            flag_month(device),
            filing_date(device),
            lead_time_text(device),
            device.timing.label().to_string(),
        ]);
    }
    writeln!(out, "{table}")?;

    let summary = &report.summary;
    writeln!(
        out,
        "{} predictive, {} reactive, {} never flagged, {} without filing",
        summary.predictive, summary.reactive, summary.not_flagged, summary.no_filing
    )?;
    if let Some(rate) = summary.hit_rate() {
        writeln!(out, "hit rate: {:.0}%", rate * 100.0)?;
    }
    if let Some(mean) = summary.mean_predictive_lead_days {
        writeln!(out, "mean predictive lead time: {mean:.0} days")?;
    }
    Ok(())
}
