//! Composite litigation-risk scoring.
//!
//! Five independent indicators contribute one point each. Indicators that
//! cannot be judged are reported as indeterminate rather than counted as
//! clear, and the tier is only reported when those unknowns cannot change it.

pub mod indicators;
pub mod tiers;

pub use indicators::{
    evaluate_metric_indicator, evaluate_regulatory_action, IndeterminateReason, Indicator,
    IndicatorResult, IndicatorStatus,
};
pub use tiers::{RiskTier, TierOutcome, MAX_SCORE};

use crate::config::ScoringThresholds;
use crate::core::{DeviceId, LitigationMilestone};
use crate::escalation::EscalationMetrics;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Risk assessment for one device as of one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub device: DeviceId,
    /// `None` only for a device with no dated data at all
    pub as_of: Option<NaiveDate>,
    /// Count of triggered indicators, 0-5
    pub score: u8,
    /// Tier of `score` alone; a lower bound when indicators are indeterminate
    pub floor_tier: RiskTier,
    pub tier: TierOutcome,
    pub triggered: Vec<Indicator>,
    pub indeterminate: Vec<Indicator>,
    pub indicators: Vec<IndicatorResult>,
    /// No valid records were available for this device
    pub insufficient_data: bool,
}

impl RiskAssessment {
    /// Whether the determinate score alone reaches `tier`.
    pub fn reaches(&self, tier: RiskTier) -> bool {
        self.floor_tier >= tier
    }
}

/// Scores escalation metrics against a threshold table.
#[derive(Debug, Clone, Default)]
pub struct RiskScorer {
    thresholds: ScoringThresholds,
}

impl RiskScorer {
    pub fn new(thresholds: ScoringThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ScoringThresholds {
        &self.thresholds
    }

    /// Produce a complete assessment. Never fails: missing data degrades to
    /// indeterminate indicators.
    ///
    /// Only milestones belonging to `device` are considered.
    pub fn assess(
        &self,
        device: &DeviceId,
        metrics: Option<&EscalationMetrics>,
        milestones: &[LitigationMilestone],
        as_of: NaiveDate,
    ) -> RiskAssessment {
        let indicators = match metrics {
            Some(metrics) => self.evaluate(device, metrics, milestones, as_of),
            None => indicators::no_data_indicators(&self.thresholds),
        };
        build_assessment(device.clone(), Some(as_of), indicators, metrics.is_none())
    }

    /// Assessment for a device with no dated data to anchor an as-of date.
    pub fn assess_undated(&self, device: &DeviceId) -> RiskAssessment {
        let indicators = indicators::no_data_indicators(&self.thresholds);
        build_assessment(device.clone(), None, indicators, true)
    }

    fn evaluate(
        &self,
        device: &DeviceId,
        metrics: &EscalationMetrics,
        milestones: &[LitigationMilestone],
        as_of: NaiveDate,
    ) -> Vec<IndicatorResult> {
        let device_milestones: Vec<LitigationMilestone> = milestones
            .iter()
            .filter(|m| &m.device == device)
            .cloned()
            .collect();
        let window_start = metrics.trailing_window.start.first_day();

        Indicator::ALL
            .iter()
            .map(|indicator| match indicator {
                Indicator::RegulatoryAction => {
                    evaluate_regulatory_action(&device_milestones, window_start, as_of)
                }
                metric => evaluate_metric_indicator(*metric, metrics, &self.thresholds),
            })
            .collect()
    }
}

fn build_assessment(
    device: DeviceId,
    as_of: Option<NaiveDate>,
    indicators: Vec<IndicatorResult>,
    insufficient_data: bool,
) -> RiskAssessment {
    let triggered: Vec<Indicator> = indicators
        .iter()
        .filter(|r| r.is_triggered())
        .map(|r| r.indicator)
        .collect();
    let indeterminate: Vec<Indicator> = indicators
        .iter()
        .filter(|r| r.is_indeterminate())
        .map(|r| r.indicator)
        .collect();

    // At most five indicators, so the casts cannot truncate.
    let score = triggered.len() as u8;
    let tier = if insufficient_data {
        TierOutcome::Indeterminate
    } else {
        TierOutcome::from_bounds(score, indeterminate.len() as u8)
    };

    debug!(
        device = %device,
        as_of = ?as_of,
        score,
        tier = %tier,
        indeterminate = indeterminate.len(),
        "scored device"
    );

    RiskAssessment {
        device,
        as_of,
        score,
        floor_tier: RiskTier::from_score(score),
        tier,
        triggered,
        indeterminate,
        indicators,
        insufficient_data,
    }
}

/// Count of assessments per reported tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub critical: usize,
    pub indeterminate: usize,
    pub total: usize,
}

pub fn build_tier_distribution<'a>(
    assessments: impl IntoIterator<Item = &'a RiskAssessment>,
) -> TierDistribution {
    let mut dist = TierDistribution::default();
    for assessment in assessments {
        match assessment.tier {
            TierOutcome::Assessed(RiskTier::Low) => dist.low += 1,
            TierOutcome::Assessed(RiskTier::Moderate) => dist.moderate += 1,
            TierOutcome::Assessed(RiskTier::High) => dist.high += 1,
            TierOutcome::Assessed(RiskTier::Critical) => dist.critical += 1,
            TierOutcome::Indeterminate => dist.indeterminate += 1,
        }
        dist.total += 1;
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowConfig;
    use crate::core::MilestoneKind;
    use crate::escalation::analyze_escalation;
    use crate::assert_tier;
    use crate::testkit::{build_series, date, milestone, ym, MonthSpec};

    fn assess(specs: &[MonthSpec], milestones: &[LitigationMilestone]) -> RiskAssessment {
        let series = build_series("Essure", ym(2013, 1), specs);
        let metrics = analyze_escalation(&series, &WindowConfig::default());
        let as_of = series.last().map(|b| b.month.last_day()).unwrap_or(date(2014, 1, 1));
        RiskScorer::default().assess(&DeviceId::new("Essure"), metrics.as_ref(), milestones, as_of)
    }

    #[test]
    fn test_no_data_is_indeterminate_not_low() {
        let assessment = assess(&[], &[]);
        assert!(assessment.insufficient_data);
        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.indeterminate.len(), 5);
        assert_tier!(assessment, indeterminate);
    }

    #[test]
    fn test_undated_assessment_is_indeterminate() {
        let assessment = RiskScorer::default().assess_undated(&DeviceId::new("Essure"));
        assert_eq!(assessment.as_of, None);
        assert!(assessment.insufficient_data);
        assert_eq!(assessment.indeterminate.len(), 5);
        assert_tier!(assessment, indeterminate);
    }

    #[test]
    fn test_quiet_device_is_low() {
        let assessment = assess(&[MonthSpec::others(4).patients(1); 12], &[]);
        assert_eq!(assessment.score, 0);
        assert!(assessment.indeterminate.is_empty());
        assert_tier!(assessment, Low);
    }

    #[test]
    fn test_all_indicators_critical() {
        let mut specs = vec![MonthSpec::others(10).patients(1); 6];
        specs.extend(vec![MonthSpec::malfunctions(40).deaths(2).patients(40); 6]);
        let recall = [milestone("Essure", MilestoneKind::Recall, date(2013, 10, 1))];

        let assessment = assess(&specs, &recall);
        assert_eq!(assessment.triggered, Indicator::ALL.to_vec());
        assert_eq!(assessment.score, 5);
        assert_tier!(assessment, Critical);
    }

    #[test]
    fn test_score_four_is_high() {
        let mut specs = vec![MonthSpec::others(10).patients(1); 6];
        specs.extend(vec![MonthSpec::malfunctions(40).deaths(2).patients(40); 6]);

        let assessment = assess(&specs, &[]);
        assert_eq!(assessment.score, 4);
        assert_tier!(assessment, High);
    }

    #[test]
    fn test_other_device_milestones_ignored() {
        let specs = vec![MonthSpec::others(10); 12];
        let recall = [milestone("IVC Filter", MilestoneKind::Recall, date(2013, 10, 1))];
        let assessment = assess(&specs, &recall);
        assert!(!assessment.triggered.contains(&Indicator::RegulatoryAction));
    }

    #[test]
    fn test_partial_history_with_recall_is_indeterminate() {
        let recall = [milestone("Essure", MilestoneKind::Recall, date(2013, 2, 1))];
        let assessment = assess(&[MonthSpec::malfunctions(3); 3], &recall);
        assert_eq!(assessment.score, 1);
        assert_eq!(assessment.floor_tier, RiskTier::Low);
        assert_eq!(assessment.indeterminate.len(), 4);
        assert_tier!(assessment, indeterminate);
    }

    #[test]
    fn test_single_window_history_is_not_scored_low() {
        let mut specs = vec![MonthSpec::others(10); 3];
        specs.extend(vec![MonthSpec::others(10).patients(10); 3]);

        let assessment = assess(&specs, &[]);
        assert_eq!(assessment.score, 0);
        assert!(assessment.indeterminate.contains(&Indicator::ReporterMixShift));
        assert!(assessment.indeterminate.contains(&Indicator::VolumeSpike));
        assert_tier!(assessment, indeterminate);
    }

    #[test]
    fn test_tier_distribution() {
        let low = assess(&[MonthSpec::malfunctions(4); 12], &[]);
        let none = assess(&[], &[]);
        let dist = build_tier_distribution([&low, &none, &low]);
        assert_eq!(dist.low, 2);
        assert_eq!(dist.indeterminate, 1);
        assert_eq!(dist.total, 3);
    }
}
