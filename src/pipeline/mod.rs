//! End-to-end analysis: raw reports in, per-device risk reports out.
//!
//! Normalization runs once over the whole batch (it mutates the device
//! registry). Everything after that is pure per device and runs on rayon
//! when parallelism is enabled.

use crate::aggregation::{aggregate_monthly_through, summarize_series, MonthlyBucket, SeriesSummary};
use crate::config::EngineConfig;
use crate::core::{DeviceId, DeviceRegistry, EventRecord, LitigationMilestone, YearMonth};
use crate::escalation::{analyze_escalation, EscalationMetrics};
use crate::normalize::{normalize_batch, RawReport, RejectionTally};
use crate::observability::{
    increment_processed, set_current_device, set_phase, set_progress, AnalysisPhase,
};
use crate::scoring::{build_tier_distribution, RiskAssessment, RiskScorer, TierDistribution};
use crate::timeline::{
    assessment_history, backtest, correlate, BacktestSummary, TimelineCorrelation,
};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, info_span};

/// Everything the engine consumes.
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub reports: Vec<RawReport>,
    pub milestones: Vec<LitigationMilestone>,
    /// Known devices and their alias search terms
    pub registry: DeviceRegistry,
    /// Device for reports that do not name one
    pub default_device: Option<DeviceId>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Assessment date; defaults to the end of the latest month with reports
    pub as_of: Option<NaiveDate>,
    pub parallel: bool,
}

/// Full result for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReport {
    pub device: DeviceId,
    pub series: Vec<MonthlyBucket>,
    pub summary: Option<SeriesSummary>,
    pub metrics: Option<EscalationMetrics>,
    pub assessment: RiskAssessment,
    pub history: Vec<RiskAssessment>,
    pub timeline: TimelineCorrelation,
}

/// Result of one pipeline run across all devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// `None` when no date was requested and no valid report carries one
    pub as_of: Option<NaiveDate>,
    pub accepted: usize,
    pub rejected: RejectionTally,
    /// Valid reports received after `as_of`, left out of every series
    pub after_as_of: usize,
    pub devices: Vec<DeviceReport>,
    pub distribution: TierDistribution,
    pub backtest: BacktestSummary,
}

impl AnalysisReport {
    pub fn device(&self, device: &DeviceId) -> Option<&DeviceReport> {
        self.devices.iter().find(|d| &d.device == device)
    }
}

/// Analyze one device from its normalized records and milestones.
///
/// Never fails: a device with no records gets an indeterminate assessment.
/// Without `as_of` the device is assessed at the end of its last month.
pub fn analyze_device(
    device: &DeviceId,
    records: &[EventRecord],
    milestones: &[LitigationMilestone],
    config: &EngineConfig,
    as_of: Option<NaiveDate>,
) -> DeviceReport {
    let scorer = RiskScorer::new(config.thresholds);
    let milestones: Vec<LitigationMilestone> = milestones
        .iter()
        .filter(|m| &m.device == device)
        .cloned()
        .collect();

    let series = {
        let _phase = set_phase(AnalysisPhase::Aggregation);
        aggregate_monthly_through(device, records, as_of.map(YearMonth::from_date))
    };
    let as_of = as_of.or_else(|| series.last().map(|bucket| bucket.month.last_day()));

    let metrics = {
        let _phase = set_phase(AnalysisPhase::EscalationAnalysis);
        analyze_escalation(&series, &config.window)
    };

    let (assessment, history) = {
        let _phase = set_phase(AnalysisPhase::Scoring);
        let assessment = match as_of {
            Some(as_of) => scorer.assess(device, metrics.as_ref(), &milestones, as_of),
            None => scorer.assess_undated(device),
        };
        let history = assessment_history(device, &series, &milestones, &config.window, &scorer);
        (assessment, history)
    };

    let timeline = {
        let _phase = set_phase(AnalysisPhase::TimelineCorrelation);
        correlate(device, &history, &milestones, config.timeline.threshold_tier)
    };

    DeviceReport {
        device: device.clone(),
        summary: summarize_series(&series),
        series,
        metrics,
        assessment,
        history,
        timeline,
    }
}

/// Map milestone devices onto canonical registry names, creating unknown ones.
fn canonicalize_milestones(
    milestones: Vec<LitigationMilestone>,
    registry: &mut DeviceRegistry,
) -> Vec<LitigationMilestone> {
    milestones
        .into_iter()
        .map(|mut milestone| {
            milestone.device = registry.get_or_create(milestone.device.as_str());
            milestone
        })
        .collect()
}

fn default_as_of(records: &[EventRecord]) -> Option<NaiveDate> {
    records
        .iter()
        .map(|r| r.received)
        .max()
        .map(|latest| YearMonth::from_date(latest).last_day())
}

/// Run the whole pipeline.
pub fn run_pipeline(
    input: PipelineInput,
    config: &EngineConfig,
    options: PipelineOptions,
) -> AnalysisReport {
    let PipelineInput {
        reports,
        milestones,
        mut registry,
        default_device,
    } = input;

    let batch = {
        let _phase = set_phase(AnalysisPhase::Normalization);
        normalize_batch(&reports, &mut registry, default_device.as_ref())
    };
    let milestones = canonicalize_milestones(milestones, &mut registry);
    let accepted = batch.records.len();
    let as_of = options.as_of.or_else(|| default_as_of(&batch.records));

    let mut grouped: BTreeMap<DeviceId, Vec<EventRecord>> = registry
        .devices()
        .map(|device| (device.name.clone(), Vec::new()))
        .collect();
    let mut after_as_of = 0;
    for record in batch.records {
        if as_of.is_some_and(|as_of| record.received > as_of) {
            after_as_of += 1;
            continue;
        }
        grouped.entry(record.device.clone()).or_default().push(record);
    }
    if after_as_of > 0 {
        debug!(after_as_of, as_of = ?as_of, "excluded reports received after the as-of date");
    }

    let work: Vec<(DeviceId, Vec<EventRecord>)> = grouped.into_iter().collect();
    set_progress(0, work.len());
    info!(
        devices = work.len(),
        accepted,
        rejected = batch.rejected.total(),
        as_of = ?as_of,
        "analyzing devices"
    );

    let analyze = |(device, records): &(DeviceId, Vec<EventRecord>)| {
        let _span = info_span!("device", device = %device).entered();
        let _device = set_current_device(device.as_str());
        let report = analyze_device(device, records, &milestones, config, as_of);
        increment_processed();
        report
    };
    let mut devices: Vec<DeviceReport> = if options.parallel {
        work.par_iter().map(analyze).collect()
    } else {
        work.iter().map(analyze).collect()
    };
    devices.sort_by(|a, b| a.device.cmp(&b.device));

    let distribution = build_tier_distribution(devices.iter().map(|d| &d.assessment));
    let backtest = backtest(devices.iter().map(|d| &d.timeline));

    AnalysisReport {
        as_of,
        accepted,
        rejected: batch.rejected,
        after_as_of,
        devices,
        distribution,
        backtest,
    }
}
