//! Configuration validation with error accumulation.
//!
//! Each check returns a stillwater [`Validation`]; [`validate_config`] combines
//! them so a user sees every configuration issue in a single run.

use std::fmt;

use stillwater::{NonEmptyVec, Validation};

use super::thresholds::{BaselineWindow, ScoringThresholds, WindowConfig};
use super::EngineConfig;
use crate::core::{Error, Result};

/// One configuration problem, tied to the dotted field it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation result accumulating every [`ConfigIssue`].
pub type ConfigValidation<T> = Validation<T, NonEmptyVec<ConfigIssue>>;

fn success() -> ConfigValidation<()> {
    Validation::Success(())
}

fn failure(issue: ConfigIssue) -> ConfigValidation<()> {
    Validation::Failure(NonEmptyVec::new(issue, Vec::new()))
}

fn from_issues(issues: Vec<ConfigIssue>) -> ConfigValidation<()> {
    let mut issues = issues.into_iter();
    match issues.next() {
        Some(first) => Validation::Failure(NonEmptyVec::new(first, issues.collect())),
        None => success(),
    }
}

/// Combine validations, keeping every failure in order.
fn combine(validations: Vec<ConfigValidation<()>>) -> ConfigValidation<()> {
    let mut issues = Vec::new();
    for validation in validations {
        if let Validation::Failure(errors) = validation {
            issues.extend(errors);
        }
    }
    from_issues(issues)
}

/// Validate the whole configuration, accumulating all issues.
pub fn validate_config(config: &EngineConfig) -> ConfigValidation<()> {
    combine(vec![
        validate_window(&config.window),
        validate_thresholds(&config.thresholds),
    ])
}

fn validate_window(window: &WindowConfig) -> ConfigValidation<()> {
    let mut issues = Vec::new();
    if window.size == 0 {
        issues.push(ConfigIssue::new("window.size", "must be at least 1 month"));
    }
    if let BaselineWindow::Explicit { start, end } = window.baseline {
        if start > end {
            issues.push(ConfigIssue::new(
                "window.baseline",
                format!("start {} is after end {}", start, end),
            ));
        }
    }
    from_issues(issues)
}

fn validate_thresholds(t: &ScoringThresholds) -> ConfigValidation<()> {
    combine(vec![
        non_negative("thresholds.volume_spike_ratio", t.volume_spike_ratio),
        percentage("thresholds.reporter_mix_shift_pp", t.reporter_mix_shift_pp),
        percentage("thresholds.severity_mix_pct", t.severity_mix_pct),
    ])
}

fn non_negative(field: &str, value: f64) -> ConfigValidation<()> {
    if value.is_finite() && value >= 0.0 {
        success()
    } else {
        failure(ConfigIssue::new(
            field,
            format!("expected a non-negative number, got {}", value),
        ))
    }
}

fn percentage(field: &str, value: f64) -> ConfigValidation<()> {
    if value > 100.0 {
        return failure(ConfigIssue::new(
            field,
            format!("{} can never be exceeded (max 100)", value),
        ));
    }
    non_negative(field, value)
}

/// Collapse accumulated issues into a single [`Error::Configuration`].
pub fn run_validation<T>(validation: ConfigValidation<T>) -> Result<T> {
    match validation {
        Validation::Success(value) => Ok(value),
        Validation::Failure(issues) => {
            let messages: Vec<String> = issues.into_vec().iter().map(ToString::to_string).collect();
            Err(Error::Configuration(messages.join("; ")))
        }
    }
}

/// Result wrapper around [`validate_config`].
pub fn validate_config_result(config: &EngineConfig) -> Result<()> {
    run_validation(validate_config(config))
}
