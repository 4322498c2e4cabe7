//! Tier classification of the composite 0-5 score
//!
//! The partition is fixed: 0-1 Low, 2-3 Moderate, 4 High, 5 Critical.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum composite score (one point per indicator)
pub const MAX_SCORE: u8 = 5;

/// Discrete litigation-risk tier, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    /// Map a composite score to its tier. Scores above 5 saturate at Critical.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=1 => RiskTier::Low,
            2..=3 => RiskTier::Moderate,
            4 => RiskTier::High,
            _ => RiskTier::Critical,
        }
    }

    /// Lowest score that maps to this tier
    pub fn min_score(&self) -> u8 {
        match self {
            RiskTier::Low => 0,
            RiskTier::Moderate => 2,
            RiskTier::High => 4,
            RiskTier::Critical => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
            RiskTier::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tier as reported to users: either assessed or explicitly indeterminate.
///
/// Indeterminate is never folded into Low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "tier", rename_all = "snake_case")]
pub enum TierOutcome {
    Assessed(RiskTier),
    Indeterminate,
}

impl TierOutcome {
    /// Tier is settled only if resolving the unknown indicators cannot move it.
    pub fn from_bounds(score: u8, indeterminate: u8) -> Self {
        let floor = RiskTier::from_score(score);
        let ceiling = RiskTier::from_score(score.saturating_add(indeterminate));
        if floor == ceiling {
            TierOutcome::Assessed(floor)
        } else {
            TierOutcome::Indeterminate
        }
    }

    pub fn tier(&self) -> Option<RiskTier> {
        match self {
            TierOutcome::Assessed(tier) => Some(*tier),
            TierOutcome::Indeterminate => None,
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, TierOutcome::Indeterminate)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TierOutcome::Assessed(tier) => tier.label(),
            TierOutcome::Indeterminate => "Indeterminate",
        }
    }
}

impl fmt::Display for TierOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
