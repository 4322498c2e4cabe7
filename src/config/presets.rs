//! Threshold presets.
//!
//! - **Strict**: flags escalation earlier (more sensitive, more false alarms)
//! - **Balanced**: the canonical indicator table
//! - **Lenient**: flags only pronounced escalation

use serde::{Deserialize, Serialize};

use super::core::EngineConfig;
use super::thresholds::ScoringThresholds;

/// Preset threshold levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetLevel {
    Strict,
    Balanced,
    Lenient,
}

impl PresetLevel {
    pub fn thresholds(self) -> ScoringThresholds {
        match self {
            PresetLevel::Strict => ScoringThresholds {
                volume_spike_ratio: 2.0,
                reporter_mix_shift_pp: 30.0,
                death_escalation: 5,
                severity_mix_pct: 15.0,
            },
            PresetLevel::Balanced => ScoringThresholds::default(),
            PresetLevel::Lenient => ScoringThresholds {
                volume_spike_ratio: 5.0,
                reporter_mix_shift_pp: 65.0,
                death_escalation: 20,
                severity_mix_pct: 40.0,
            },
        }
    }

    /// Apply this preset to an existing configuration, keeping window and timeline settings.
    pub fn apply(self, config: EngineConfig) -> EngineConfig {
        EngineConfig {
            thresholds: self.thresholds(),
            ..config
        }
    }
}
