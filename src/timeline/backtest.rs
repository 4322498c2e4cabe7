//! Cross-device backtest of threshold choices.

use super::{SignalTiming, TimelineCorrelation};
use serde::{Deserialize, Serialize};

/// Aggregate signal timing across devices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub devices: usize,
    pub predictive: usize,
    pub reactive: usize,
    pub not_flagged: usize,
    pub no_filing: usize,
    /// Mean lead time over predictive devices only
    pub mean_predictive_lead_days: Option<f64>,
}

impl BacktestSummary {
    /// Share of devices with a filing that were flagged before it.
    pub fn hit_rate(&self) -> Option<f64> {
        let with_filing = self.predictive + self.reactive + self.not_flagged;
        (with_filing > 0).then(|| self.predictive as f64 / with_filing as f64)
    }
}

pub fn backtest<'a>(
    correlations: impl IntoIterator<Item = &'a TimelineCorrelation>,
) -> BacktestSummary {
    let mut summary = BacktestSummary::default();
    let mut predictive_leads = Vec::new();

    for correlation in correlations {
        summary.devices += 1;
        match correlation.timing {
            SignalTiming::Predictive => {
                summary.predictive += 1;
                predictive_leads.extend(correlation.lead_time_days);
            }
            SignalTiming::Reactive => summary.reactive += 1,
            SignalTiming::NotFlagged => summary.not_flagged += 1,
            SignalTiming::NoFiling => summary.no_filing += 1,
        }
    }

    if !predictive_leads.is_empty() {
        let total: i64 = predictive_leads.iter().sum();
        summary.mean_predictive_lead_days = Some(total as f64 / predictive_leads.len() as f64);
    }
    summary
}
