use crate::core::YearMonth;
use crate::scoring::RiskTier;
use serde::{Deserialize, Serialize};

/// Which months form the baseline window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BaselineWindow {
    /// The first `size` months of the series
    #[default]
    Leading,
    /// An explicit inclusive month range
    Explicit { start: YearMonth, end: YearMonth },
}

/// Analysis window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Months per window (baseline and trailing)
    #[serde(default = "default_window_size")]
    pub size: usize,

    #[serde(default)]
    pub baseline: BaselineWindow,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: default_window_size(),
            baseline: BaselineWindow::default(),
        }
    }
}

impl WindowConfig {
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn with_baseline(mut self, start: YearMonth, end: YearMonth) -> Self {
        self.baseline = BaselineWindow::Explicit { start, end };
        self
    }
}

/// Indicator thresholds for the risk scorer
///
/// ```toml
/// [thresholds]
/// volume_spike_ratio = 3.0      # growth ratio must exceed this
/// reporter_mix_shift_pp = 50.0  # patient-share change in percentage points
/// death_escalation = 10         # trailing-window deaths, inclusive
/// severity_mix_pct = 25.0       # injury+malfunction share of trailing window
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringThresholds {
    #[serde(default = "default_volume_spike_ratio")]
    pub volume_spike_ratio: f64,

    #[serde(default = "default_reporter_mix_shift_pp")]
    pub reporter_mix_shift_pp: f64,

    #[serde(default = "default_death_escalation")]
    pub death_escalation: u32,

    #[serde(default = "default_severity_mix_pct")]
    pub severity_mix_pct: f64,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            volume_spike_ratio: default_volume_spike_ratio(),
            reporter_mix_shift_pp: default_reporter_mix_shift_pp(),
            death_escalation: default_death_escalation(),
            severity_mix_pct: default_severity_mix_pct(),
        }
    }
}

/// Backtesting configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Tier the score must reach to count as a flag
    #[serde(default = "default_threshold_tier")]
    pub threshold_tier: RiskTier,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            threshold_tier: default_threshold_tier(),
        }
    }
}

pub fn default_window_size() -> usize {
    6
}
pub fn default_volume_spike_ratio() -> f64 {
    3.0
}
pub fn default_reporter_mix_shift_pp() -> f64 {
    50.0
}
pub fn default_death_escalation() -> u32 {
    10
}
pub fn default_severity_mix_pct() -> f64 {
    25.0
}
fn default_threshold_tier() -> RiskTier {
    RiskTier::High
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_thresholds_use_defaults() {
        let thresholds: ScoringThresholds = toml::from_str("death_escalation = 25").unwrap();
        assert_eq!(thresholds.death_escalation, 25);
        assert_eq!(thresholds.volume_spike_ratio, 3.0);
        assert_eq!(thresholds.severity_mix_pct, 25.0);
    }

    #[test]
    fn test_explicit_baseline_parses() {
        let window: WindowConfig = toml::from_str(
            r#"
size = 3
baseline = { mode = "explicit", start = "2012-01", end = "2012-06" }
"#,
        )
        .unwrap();
        assert_eq!(window.size, 3);
        assert!(matches!(window.baseline, BaselineWindow::Explicit { .. }));
    }
}
