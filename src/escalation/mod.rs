//! Escalation analysis over a monthly series.
//!
//! Compares the trailing window (the most recent `size` months) against a
//! baseline window (the first `size` months before the trailing window, or an
//! explicit range). The leading baseline never overlaps the trailing window,
//! so a series shorter than `2 * size` months has a short or empty baseline.
//! Windows with fewer months than requested are flagged `partial_window`.
//! An undefined growth ratio is `None`, never infinity.

use crate::aggregation::{window_total, MonthlyBucket};
use crate::config::{BaselineWindow, WindowConfig};
use crate::core::{DeviceId, YearMonth};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Month span actually covered by a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpan {
    pub start: YearMonth,
    pub end: YearMonth,
    /// Months present in the series inside this span
    pub months: usize,
    /// Months the window was asked to cover
    pub requested: usize,
}

impl WindowSpan {
    pub fn is_partial(&self) -> bool {
        self.months < self.requested
    }
}

/// Trend metrics for one device as of the last month of its series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationMetrics {
    pub device: DeviceId,
    pub as_of_month: YearMonth,
    pub window_size: usize,
    pub baseline_window: Option<WindowSpan>,
    pub trailing_window: WindowSpan,

    /// Mean monthly total over the baseline window
    pub baseline_mean: f64,
    pub baseline_total: u32,
    /// Highest monthly total in the trailing window
    pub peak_count: u32,
    pub peak_month: YearMonth,
    pub trailing_total: u32,
    /// `peak_count / baseline_mean`; `None` when the baseline mean is zero
    pub growth_ratio: Option<f64>,

    /// Patient-filed share (0..=1) of the baseline window
    pub initial_patient_share: f64,
    /// Patient-filed share (0..=1) of the trailing window
    pub final_patient_share: f64,
    /// Change in patient share, percentage points
    pub reporter_mix_shift: f64,

    /// Plain sums over the trailing window, not rates
    pub death_total: u32,
    pub injury_total: u32,
    pub malfunction_total: u32,
    /// Injury+malfunction share of the trailing window in percent; `None` if the window is empty
    pub severity_share_pct: Option<f64>,

    pub partial_window: bool,
}

/// Patient-filed share of a window; 0 for an empty window.
pub fn patient_share(window: &[MonthlyBucket]) -> f64 {
    let total = window_total(window);
    if total == 0 {
        return 0.0;
    }
    let patients: u32 = window.iter().map(|b| b.reporters.patient).sum();
    f64::from(patients) / f64::from(total)
}

fn span_of(window: &[MonthlyBucket], requested: usize) -> Option<WindowSpan> {
    Some(WindowSpan {
        start: window.first()?.month,
        end: window.last()?.month,
        months: window.len(),
        requested,
    })
}

fn select_baseline<'a>(
    series: &'a [MonthlyBucket],
    config: &WindowConfig,
) -> (&'a [MonthlyBucket], usize) {
    match config.baseline {
        BaselineWindow::Leading => {
            let size = config.size.max(1);
            let before_trailing = series.len().saturating_sub(size);
            (&series[..size.min(before_trailing)], size)
        }
        BaselineWindow::Explicit { start, end } => {
            let requested = usize::try_from(start.months_until(end) + 1).unwrap_or(0);
            let from = series.partition_point(|b| b.month < start);
            let to = series.partition_point(|b| b.month <= end);
            (&series[from..to.max(from)], requested)
        }
    }
}

/// Compute escalation metrics for the most recent window of `series`.
///
/// Returns `None` for an empty series: there is nothing to assess.
pub fn analyze_escalation(
    series: &[MonthlyBucket],
    config: &WindowConfig,
) -> Option<EscalationMetrics> {
    let last = series.last()?;
    let size = config.size.max(1);

    let trailing = &series[series.len().saturating_sub(size)..];
    let trailing_window = span_of(trailing, size)?;
    let (baseline, baseline_requested) = select_baseline(series, config);
    let baseline_window = span_of(baseline, baseline_requested);

    let baseline_total = window_total(baseline);
    let baseline_mean = if baseline.is_empty() {
        0.0
    } else {
        f64::from(baseline_total) / baseline.len() as f64
    };

    // Earliest month wins ties.
    let peak = trailing
        .iter()
        .fold(&trailing[0], |best, b| if b.total > best.total { b } else { best });
    let growth_ratio = (baseline_mean > 0.0).then(|| f64::from(peak.total) / baseline_mean);

    let initial_patient_share = patient_share(baseline);
    let final_patient_share = patient_share(trailing);

    let trailing_total = window_total(trailing);
    let death_total: u32 = trailing.iter().map(|b| b.outcomes.death).sum();
    let injury_total: u32 = trailing.iter().map(|b| b.outcomes.injury).sum();
    let malfunction_total: u32 = trailing.iter().map(|b| b.outcomes.malfunction).sum();
    let severity_share_pct = (trailing_total > 0).then(|| {
        f64::from(injury_total + malfunction_total) / f64::from(trailing_total) * 100.0
    });

    let partial_window = trailing_window.is_partial()
        || baseline_window.map_or(true, |span| span.is_partial());

    let metrics = EscalationMetrics {
        device: last.device.clone(),
        as_of_month: last.month,
        window_size: size,
        baseline_window,
        trailing_window,
        baseline_mean,
        baseline_total,
        peak_count: peak.total,
        peak_month: peak.month,
        trailing_total,
        growth_ratio,
        initial_patient_share,
        final_patient_share,
        reporter_mix_shift: (final_patient_share - initial_patient_share) * 100.0,
        death_total,
        injury_total,
        malfunction_total,
        severity_share_pct,
        partial_window,
    };

    debug!(
        device = %metrics.device,
        as_of = %metrics.as_of_month,
        growth_ratio = ?metrics.growth_ratio,
        reporter_mix_shift = metrics.reporter_mix_shift,
        partial = metrics.partial_window,
        "computed escalation metrics"
    );
    Some(metrics)
}
