//! Timeline correlation of risk signals against litigation milestones.
//!
//! A device's assessment history is scanned for the first month whose
//! determinate score reaches the threshold tier. Lead times are measured in
//! days from that month's assessment date to each milestone: positive means
//! the signal came first, negative means it lagged.

pub mod backtest;

pub use backtest::{backtest, BacktestSummary};

use crate::aggregation::MonthlyBucket;
use crate::config::WindowConfig;
use crate::core::{first_milestone, DeviceId, LitigationMilestone, MilestoneKind, YearMonth};
use crate::escalation::analyze_escalation;
use crate::scoring::{RiskAssessment, RiskScorer, RiskTier, TierOutcome};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Assess every prefix of `series`, one assessment per month.
///
/// Each assessment sees only the months up to and including its own, dated
/// the last day of that month. Milestones after that date are invisible to it.
pub fn assessment_history(
    device: &DeviceId,
    series: &[MonthlyBucket],
    milestones: &[LitigationMilestone],
    window: &WindowConfig,
    scorer: &RiskScorer,
) -> Vec<RiskAssessment> {
    (1..=series.len())
        .map(|end| {
            let prefix = &series[..end];
            let as_of = prefix[end - 1].month.last_day();
            let metrics = analyze_escalation(prefix, window);
            scorer.assess(device, metrics.as_ref(), milestones, as_of)
        })
        .collect()
}

/// First assessment whose determinate score reaches the threshold tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagPoint {
    pub month: YearMonth,
    pub date: NaiveDate,
    pub score: u8,
    pub tier: TierOutcome,
}

/// How the first flag relates to the first filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalTiming {
    /// Flag strictly before the first filing
    Predictive,
    /// Flag on or after the first filing
    Reactive,
    /// Filing known, threshold never reached
    NotFlagged,
    /// No first-filing milestone to compare against
    NoFiling,
}

impl SignalTiming {
    pub fn label(&self) -> &'static str {
        match self {
            SignalTiming::Predictive => "predictive",
            SignalTiming::Reactive => "reactive",
            SignalTiming::NotFlagged => "not flagged",
            SignalTiming::NoFiling => "no filing",
        }
    }
}

/// Lead/lag of a device's risk signal relative to its milestones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineCorrelation {
    pub device: DeviceId,
    pub threshold: RiskTier,
    pub first_flag: Option<FlagPoint>,
    pub first_filing: Option<NaiveDate>,
    /// Days from first flag to first filing; `None` if either is missing
    pub lead_time_days: Option<i64>,
    pub recall_lead_days: Option<i64>,
    pub mdl_lead_days: Option<i64>,
    pub settlement_total_usd: Option<f64>,
    pub timing: SignalTiming,
}

impl TimelineCorrelation {
    pub fn was_flagged(&self) -> bool {
        self.first_flag.is_some()
    }
}

fn lead_days(flag: Option<&FlagPoint>, milestone: Option<&LitigationMilestone>) -> Option<i64> {
    let (flag, milestone) = (flag?, milestone?);
    Some((milestone.date - flag.date).num_days())
}

fn classify_timing(flagged: bool, filed: bool, lead: Option<i64>) -> SignalTiming {
    match (filed, flagged, lead) {
        (false, _, _) => SignalTiming::NoFiling,
        (true, false, _) => SignalTiming::NotFlagged,
        (true, true, Some(days)) if days > 0 => SignalTiming::Predictive,
        (true, true, _) => SignalTiming::Reactive,
    }
}

/// Correlate a device's assessment history with its milestones.
///
/// `history` must be chronological. Milestones for other devices are ignored.
pub fn correlate(
    device: &DeviceId,
    history: &[RiskAssessment],
    milestones: &[LitigationMilestone],
    threshold: RiskTier,
) -> TimelineCorrelation {
    let own: Vec<LitigationMilestone> = milestones
        .iter()
        .filter(|m| &m.device == device)
        .cloned()
        .collect();

    let first_flag = history
        .iter()
        .filter(|assessment| assessment.reaches(threshold))
        .find_map(|assessment| {
            let date = assessment.as_of?;
            Some(FlagPoint {
                month: YearMonth::from_date(date),
                date,
                score: assessment.score,
                tier: assessment.tier,
            })
        });

    let filing = first_milestone(&own, MilestoneKind::FirstFiling);
    let lead_time_days = lead_days(first_flag.as_ref(), filing);
    let recall_lead_days = lead_days(
        first_flag.as_ref(),
        first_milestone(&own, MilestoneKind::Recall),
    );
    let mdl_lead_days = lead_days(
        first_flag.as_ref(),
        first_milestone(&own, MilestoneKind::MdlFormed),
    );

    let amounts: Vec<f64> = own
        .iter()
        .filter(|m| m.kind == MilestoneKind::Settlement)
        .filter_map(|m| m.amount_usd)
        .collect();
    let settlement_total_usd = (!amounts.is_empty()).then(|| amounts.iter().sum());

    let timing = classify_timing(first_flag.is_some(), filing.is_some(), lead_time_days);
    debug!(
        device = %device,
        threshold = %threshold,
        lead_time_days = ?lead_time_days,
        timing = timing.label(),
        "correlated timeline"
    );

    TimelineCorrelation {
        device: device.clone(),
        threshold,
        first_flag,
        first_filing: filing.map(|m| m.date),
        lead_time_days,
        recall_lead_days,
        mdl_lead_days,
        settlement_total_usd,
        timing,
    }
}
