//! Report writers: JSON, Markdown and a colored terminal table.
//!
//! Every writer shows an indeterminate tier as such, never as Low.

use crate::pipeline::{AnalysisReport, DeviceReport};
use crate::scoring::{IndicatorResult, IndicatorStatus, RiskAssessment, RiskTier, TierOutcome};
use crate::timeline::{SignalTiming, TimelineCorrelation};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "terminal" | "text" => Ok(OutputFormat::Terminal),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// Renders an [`AnalysisReport`]; the sink is flushed before returning.
pub trait OutputWriter {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()>;
}

pub fn create_writer<'a>(
    format: OutputFormat,
    writer: Box<dyn Write + 'a>,
) -> Box<dyn OutputWriter + 'a> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
    }
}

/// Tier text that never reads as Low when the tier is unknown.
pub fn tier_text(assessment: &RiskAssessment) -> String {
    match assessment.tier {
        TierOutcome::Assessed(tier) => tier.label().to_string(),
        TierOutcome::Indeterminate if assessment.insufficient_data => {
            "Indeterminate (no data)".to_string()
        }
        TierOutcome::Indeterminate => {
            format!("Indeterminate (at least {})", assessment.floor_tier)
        }
    }
}

fn as_of_text(report: &AnalysisReport) -> String {
    report
        .as_of
        .map_or_else(|| "undated (no valid reports)".to_string(), |d| d.to_string())
}

pub fn lead_time_text(timeline: &TimelineCorrelation) -> String {
    match (timeline.timing, timeline.lead_time_days) {
        (SignalTiming::NotFlagged, _) => "not flagged".to_string(),
        (SignalTiming::NoFiling, _) => "no filing".to_string(),
        (_, Some(days)) => format!("{days:+} days"),
        (_, None) => "-".to_string(),
    }
}

fn names(indicators: &[crate::scoring::Indicator]) -> String {
    if indicators.is_empty() {
        "-".to_string()
    } else {
        indicators
            .iter()
            .map(|i| i.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn status_text(result: &IndicatorResult) -> String {
    match result.status {
        IndicatorStatus::Triggered => "triggered".to_string(),
        IndicatorStatus::Clear => "clear".to_string(),
        IndicatorStatus::Indeterminate(reason) => format!("indeterminate: {}", reason.describe()),
    }
}

fn observed_text(result: &IndicatorResult) -> String {
    result
        .observed
        .map_or_else(|| "-".to_string(), |value| format!("{value:.2}"))
}

fn report_count(device: &DeviceReport) -> u32 {
    device.summary.as_ref().map_or(0, |s| s.total_reports)
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, report)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        self.write_header(report)?;
        self.write_distribution(report)?;
        self.write_device_table(report)?;
        for device in &report.devices {
            self.write_device_details(device)?;
        }
        self.write_backtest(report)?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> MarkdownWriter<W> {
    fn write_header(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        writeln!(self.writer, "# Device Litigation-Risk Report")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "As of: {}", as_of_text(report))?;
        writeln!(self.writer, "Version: {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Reports accepted: {}, rejected: {} (malformed date {}, missing date {}, no device {})",
            report.accepted,
            report.rejected.total(),
            report.rejected.malformed_date,
            report.rejected.missing_date,
            report.rejected.missing_device
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_distribution(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        let dist = &report.distribution;
        writeln!(self.writer, "## Tier Distribution")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Tier | Devices |")?;
        writeln!(self.writer, "|------|---------|")?;
        for (label, count) in [
            (RiskTier::Critical.label(), dist.critical),
            (RiskTier::High.label(), dist.high),
            (RiskTier::Moderate.label(), dist.moderate),
            (RiskTier::Low.label(), dist.low),
            ("Indeterminate", dist.indeterminate),
        ] {
            writeln!(self.writer, "| {label} | {count} |")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_device_table(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        writeln!(self.writer, "## Devices")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "| Device | Reports | Score | Tier | Triggered | Indeterminate | Lead time |"
        )?;
        writeln!(
            self.writer,
            "|--------|---------|-------|------|-----------|---------------|-----------|"
        )?;
        for device in &report.devices {
            let a = &device.assessment;
            writeln!(
                self.writer,
                "| {} | {} | {}/5 | {} | {} | {} | {} |",
                device.device,
                report_count(device),
                a.score,
                tier_text(a),
                names(&a.triggered),
                names(&a.indeterminate),
                lead_time_text(&device.timeline)
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_device_details(&mut self, device: &DeviceReport) -> anyhow::Result<()> {
        writeln!(self.writer, "### {}", device.device)?;
        writeln!(self.writer)?;
        if let Some(summary) = &device.summary {
            writeln!(
                self.writer,
                "{} reports from {} to {}; peak {} in {}.",
                summary.total_reports,
                summary.first_month,
                summary.last_month,
                summary.peak_total,
                summary.peak_month
            )?;
        } else {
            writeln!(self.writer, "No valid reports: insufficient data.")?;
        }
        writeln!(self.writer)?;
        writeln!(self.writer, "| Indicator | Status | Observed | Threshold |")?;
        writeln!(self.writer, "|-----------|--------|----------|-----------|")?;
        for result in &device.assessment.indicators {
            writeln!(
                self.writer,
                "| {} | {} | {} | {} |",
                result.indicator,
                status_text(result),
                observed_text(result),
                result.threshold
            )?;
        }
        writeln!(self.writer)?;

        let timeline = &device.timeline;
        match &timeline.first_flag {
            Some(flag) => writeln!(
                self.writer,
                "First reached {} in {} (score {}).",
                timeline.threshold, flag.month, flag.score
            )?,
            None => writeln!(self.writer, "Never reached {}.", timeline.threshold)?,
        }
        if let Some(filing) = timeline.first_filing {
            writeln!(
                self.writer,
                "First filing {}: lead time {}.",
                filing,
                lead_time_text(timeline)
            )?;
        }
        if let Some(total) = timeline.settlement_total_usd {
            writeln!(self.writer, "Known settlements: ${total:.0}.")?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_backtest(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        let bt = &report.backtest;
        writeln!(self.writer, "## Backtest")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Outcome | Devices |")?;
        writeln!(self.writer, "|---------|---------|")?;
        writeln!(self.writer, "| Flagged before filing | {} |", bt.predictive)?;
        writeln!(self.writer, "| Flagged on/after filing | {} |", bt.reactive)?;
        writeln!(self.writer, "| Never flagged | {} |", bt.not_flagged)?;
        writeln!(self.writer, "| No filing date | {} |", bt.no_filing)?;
        if let Some(mean) = bt.mean_predictive_lead_days {
            writeln!(self.writer)?;
            writeln!(self.writer, "Mean predictive lead time: {mean:.0} days")?;
        }
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

fn tier_color(assessment: &RiskAssessment) -> Color {
    match assessment.tier {
        TierOutcome::Assessed(RiskTier::Critical) => Color::Red,
        TierOutcome::Assessed(RiskTier::High) => Color::DarkYellow,
        TierOutcome::Assessed(RiskTier::Moderate) => Color::Yellow,
        TierOutcome::Assessed(RiskTier::Low) => Color::Green,
        TierOutcome::Indeterminate => Color::Magenta,
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_report(&mut self, report: &AnalysisReport) -> anyhow::Result<()> {
        writeln!(
            self.writer,
            "{} {}",
            "Litigation-risk assessment as of".bold(),
            as_of_text(report).bold()
        )?;
        writeln!(
            self.writer,
            "{} reports accepted, {} rejected",
            report.accepted,
            report.rejected.total()
        )?;
        writeln!(self.writer)?;

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Device",
                "Reports",
                "Score",
                "Tier",
                "Triggered",
                "Indeterminate",
                "Lead time",
            ]);
        for device in &report.devices {
            let a = &device.assessment;
            table.add_row(vec![
                Cell::new(device.device.as_str()),
                Cell::new(report_count(device)),
                Cell::new(format!("{}/5", a.score)),
                Cell::new(tier_text(a)).fg(tier_color(a)),
                Cell::new(names(&a.triggered)),
                Cell::new(names(&a.indeterminate)),
                Cell::new(lead_time_text(&device.timeline)),
            ]);
        }
        writeln!(self.writer, "{table}")?;

        let bt = &report.backtest;
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", "Backtest".bold())?;
        writeln!(
            self.writer,
            "  {} predictive, {} reactive, {} never flagged, {} without filing",
            bt.predictive.to_string().green(),
            bt.reactive.to_string().yellow(),
            bt.not_flagged.to_string().red(),
            bt.no_filing
        )?;
        if let Some(mean) = bt.mean_predictive_lead_days {
            writeln!(self.writer, "  mean predictive lead time: {mean:.0} days")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::core::MilestoneKind;
    use crate::normalize::RawReport;
    use crate::pipeline::{run_pipeline, PipelineInput, PipelineOptions};
    use crate::testkit::{date, milestone};

    fn sample_report() -> AnalysisReport {
        let reports = (1..=12)
            .map(|month| {
                RawReport::new()
                    .with("device", "Essure")
                    .with("date_received", format!("2015{month:02}10"))
                    .with("event_type", "Other")
                    .with("report_source_code", "P")
            })
            .collect();
        let input = PipelineInput {
            reports,
            milestones: vec![milestone("IVC Filter", MilestoneKind::FirstFiling, date(2015, 3, 1))],
            ..PipelineInput::default()
        };
        run_pipeline(input, &EngineConfig::default(), PipelineOptions::default())
    }

    fn render(format: OutputFormat) -> String {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        create_writer(format, Box::new(&mut buffer))
            .write_report(&sample_report())
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_json_round_trips_as_value() {
        let json: serde_json::Value = serde_json::from_str(&render(OutputFormat::Json)).unwrap();
        assert_eq!(json["devices"].as_array().unwrap().len(), 2);
        assert_eq!(json["devices"][1]["assessment"]["tier"]["status"], "indeterminate");
    }

    #[test]
    fn test_markdown_distinguishes_indeterminate_from_low() {
        let markdown = render(OutputFormat::Markdown);
        assert!(markdown.contains("| Essure | 12 | 0/5 | Low |"));
        assert!(markdown.contains("| IVC Filter | 0 | 0/5 | Indeterminate (no data) |"));
        assert!(markdown.contains("No valid reports: insufficient data."));
        assert!(markdown.contains("| Never flagged | 1 |"));
    }

    /// Accepts every write, fails the final flush.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::other("no space left on device"))
        }
    }

    #[test]
    fn test_flush_failure_is_reported() {
        let report = sample_report();
        for format in [OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Terminal] {
            let result = create_writer(format, Box::new(FullDisk)).write_report(&report);
            crate::assert_contains_error!(result, "no space left on device");
        }
    }

    #[test]
    fn test_markdown_marks_undated_report() {
        let report = run_pipeline(
            PipelineInput::default(),
            &EngineConfig::default(),
            PipelineOptions::default(),
        );
        let mut buffer = Vec::new();
        create_writer(OutputFormat::Markdown, Box::new(&mut buffer))
            .write_report(&report)
            .unwrap();
        let markdown = String::from_utf8(buffer).unwrap();
        assert!(markdown.contains("As of: undated (no valid reports)"));
    }

    #[test]
    fn test_terminal_lists_devices() {
        let text = render(OutputFormat::Terminal);
        assert!(text.contains("Essure"));
        assert!(text.contains("Indeterminate (no data)"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("MD".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
