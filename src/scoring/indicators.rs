//! The five boolean risk indicators and their evaluation.

use crate::config::ScoringThresholds;
use crate::core::{LitigationMilestone, MilestoneKind};
use crate::escalation::EscalationMetrics;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    VolumeSpike,
    ReporterMixShift,
    DeathEscalation,
    SeverityMixShift,
    RegulatoryAction,
}

impl Indicator {
    pub const ALL: [Indicator; 5] = [
        Indicator::VolumeSpike,
        Indicator::ReporterMixShift,
        Indicator::DeathEscalation,
        Indicator::SeverityMixShift,
        Indicator::RegulatoryAction,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Indicator::VolumeSpike => "volume_spike",
            Indicator::ReporterMixShift => "reporter_mix_shift",
            Indicator::DeathEscalation => "death_escalation",
            Indicator::SeverityMixShift => "severity_mix_shift",
            Indicator::RegulatoryAction => "regulatory_action",
        }
    }

    /// Whether the indicator is derived from window metrics
    pub fn uses_window_metrics(&self) -> bool {
        !matches!(self, Indicator::RegulatoryAction)
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndeterminateReason {
    /// No valid records for the device
    NoData,
    /// Baseline or trailing window shorter than requested
    PartialWindow,
    /// Baseline mean of zero
    UndefinedGrowthRatio,
    /// Trailing window contains no reports
    EmptyTrailingWindow,
}

impl IndeterminateReason {
    pub fn describe(&self) -> &'static str {
        match self {
            IndeterminateReason::NoData => "no valid reports",
            IndeterminateReason::PartialWindow => "insufficient history for a full window",
            IndeterminateReason::UndefinedGrowthRatio => "baseline window has no reports",
            IndeterminateReason::EmptyTrailingWindow => "trailing window has no reports",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum IndicatorStatus {
    Triggered,
    Clear,
    Indeterminate(IndeterminateReason),
}

/// Outcome of one indicator with the value it was judged on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorResult {
    pub indicator: Indicator,
    pub status: IndicatorStatus,
    pub observed: Option<f64>,
    pub threshold: f64,
}

impl IndicatorResult {
    fn judged(indicator: Indicator, observed: f64, threshold: f64, triggered: bool) -> Self {
        Self {
            indicator,
            status: if triggered {
                IndicatorStatus::Triggered
            } else {
                IndicatorStatus::Clear
            },
            observed: Some(observed),
            threshold,
        }
    }

    fn indeterminate(indicator: Indicator, threshold: f64, reason: IndeterminateReason) -> Self {
        Self {
            indicator,
            status: IndicatorStatus::Indeterminate(reason),
            observed: None,
            threshold,
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.status == IndicatorStatus::Triggered
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self.status, IndicatorStatus::Indeterminate(_))
    }
}

fn threshold_of(indicator: Indicator, thresholds: &ScoringThresholds) -> f64 {
    match indicator {
        Indicator::VolumeSpike => thresholds.volume_spike_ratio,
        Indicator::ReporterMixShift => thresholds.reporter_mix_shift_pp,
        Indicator::DeathEscalation => f64::from(thresholds.death_escalation),
        Indicator::SeverityMixShift => thresholds.severity_mix_pct,
        Indicator::RegulatoryAction => 1.0,
    }
}

/// Evaluate one window-metric indicator.
///
/// `RegulatoryAction` is not a window metric; see [`evaluate_regulatory_action`].
pub fn evaluate_metric_indicator(
    indicator: Indicator,
    metrics: &EscalationMetrics,
    thresholds: &ScoringThresholds,
) -> IndicatorResult {
    let threshold = threshold_of(indicator, thresholds);
    if metrics.partial_window && indicator.uses_window_metrics() {
        return IndicatorResult::indeterminate(
            indicator,
            threshold,
            IndeterminateReason::PartialWindow,
        );
    }

    match indicator {
        Indicator::VolumeSpike => match metrics.growth_ratio {
            Some(ratio) => IndicatorResult::judged(indicator, ratio, threshold, ratio > threshold),
            None => IndicatorResult::indeterminate(
                indicator,
                threshold,
                IndeterminateReason::UndefinedGrowthRatio,
            ),
        },
        Indicator::ReporterMixShift => {
            let shift = metrics.reporter_mix_shift;
            IndicatorResult::judged(indicator, shift, threshold, shift > threshold)
        }
        Indicator::DeathEscalation => IndicatorResult::judged(
            indicator,
            f64::from(metrics.death_total),
            threshold,
            metrics.death_total >= thresholds.death_escalation,
        ),
        Indicator::SeverityMixShift => match metrics.severity_share_pct {
            Some(share) => IndicatorResult::judged(indicator, share, threshold, share > threshold),
            None => IndicatorResult::indeterminate(
                indicator,
                threshold,
                IndeterminateReason::EmptyTrailingWindow,
            ),
        },
        Indicator::RegulatoryAction => IndicatorResult::indeterminate(
            indicator,
            threshold,
            IndeterminateReason::NoData,
        ),
    }
}

/// Recall milestone dated inside `[window_start, as_of]`.
pub fn evaluate_regulatory_action(
    milestones: &[LitigationMilestone],
    window_start: NaiveDate,
    as_of: NaiveDate,
) -> IndicatorResult {
    let recalls = milestones
        .iter()
        .filter(|m| m.kind == MilestoneKind::Recall)
        .filter(|m| m.date >= window_start && m.date <= as_of)
        .count();
    IndicatorResult::judged(
        Indicator::RegulatoryAction,
        recalls as f64,
        1.0,
        recalls > 0,
    )
}

/// All five indicators for a device with no usable data.
pub fn no_data_indicators(thresholds: &ScoringThresholds) -> Vec<IndicatorResult> {
    Indicator::ALL
        .iter()
        .map(|indicator| {
            IndicatorResult::indeterminate(
                *indicator,
                threshold_of(*indicator, thresholds),
                IndeterminateReason::NoData,
            )
        })
        .collect()
}
