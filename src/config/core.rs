use serde::{Deserialize, Serialize};

use super::thresholds::{ScoringThresholds, TimelineConfig, WindowConfig};

/// Root configuration structure for maude-risk
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EngineConfig {
    /// Analysis window configuration
    #[serde(default)]
    pub window: WindowConfig,

    /// Indicator thresholds
    #[serde(default)]
    pub thresholds: ScoringThresholds,

    /// Backtesting configuration
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Output configuration
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub default_format: Option<String>,
}
