//! Core domain types shared by every pipeline stage.

pub mod device;
pub mod errors;
pub mod month;

pub use device::{Device, DeviceId, DeviceRegistry};
pub use errors::{Error, Result};
pub use month::YearMonth;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome category of an adverse-event report. Exactly one per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
    Death,
    Injury,
    Malfunction,
    Other,
    Unknown,
}

impl OutcomeCategory {
    pub const ALL: [OutcomeCategory; 5] = [
        OutcomeCategory::Death,
        OutcomeCategory::Injury,
        OutcomeCategory::Malfunction,
        OutcomeCategory::Other,
        OutcomeCategory::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeCategory::Death => "Death",
            OutcomeCategory::Injury => "Injury",
            OutcomeCategory::Malfunction => "Malfunction",
            OutcomeCategory::Other => "Other",
            OutcomeCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for OutcomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who filed the report. Exactly one per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReporterType {
    Patient,
    Healthcare,
    Manufacturer,
    Other,
}

impl ReporterType {
    pub const ALL: [ReporterType; 4] = [
        ReporterType::Patient,
        ReporterType::Healthcare,
        ReporterType::Manufacturer,
        ReporterType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReporterType::Patient => "Patient",
            ReporterType::Healthcare => "Healthcare",
            ReporterType::Manufacturer => "Manufacturer",
            ReporterType::Other => "Other",
        }
    }
}

impl fmt::Display for ReporterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One normalized adverse-event report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub device: DeviceId,
    /// MDR report number or key, when the raw report carried one
    pub report_number: Option<String>,
    /// Date FDA received the report; determines the bucket month
    pub received: NaiveDate,
    /// Date the event occurred, if reported and parseable
    pub event_date: Option<NaiveDate>,
    pub outcome: OutcomeCategory,
    pub reporter: ReporterType,
}

impl EventRecord {
    pub fn month(&self) -> YearMonth {
        YearMonth::from_date(self.received)
    }
}

/// Kind of a curated litigation or regulatory milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    Recall,
    FirstFiling,
    #[serde(alias = "mdl_formation", alias = "mdl")]
    MdlFormed,
    Settlement,
}

impl MilestoneKind {
    pub fn label(&self) -> &'static str {
        match self {
            MilestoneKind::Recall => "Recall",
            MilestoneKind::FirstFiling => "First filing",
            MilestoneKind::MdlFormed => "MDL formed",
            MilestoneKind::Settlement => "Settlement",
        }
    }
}

impl fmt::Display for MilestoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A dated legal or regulatory event for a device. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LitigationMilestone {
    pub device: DeviceId,
    pub kind: MilestoneKind,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_usd: Option<f64>,
}

impl LitigationMilestone {
    pub fn new(device: impl Into<DeviceId>, kind: MilestoneKind, date: NaiveDate) -> Self {
        Self {
            device: device.into(),
            kind,
            date,
            amount_usd: None,
        }
    }

    pub fn with_amount(mut self, amount_usd: f64) -> Self {
        self.amount_usd = Some(amount_usd);
        self
    }
}

/// Earliest milestone of `kind` among `milestones`.
pub fn first_milestone(
    milestones: &[LitigationMilestone],
    kind: MilestoneKind,
) -> Option<&LitigationMilestone> {
    milestones
        .iter()
        .filter(|m| m.kind == kind)
        .min_by_key(|m| m.date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestone_kind_deserializes_aliases() {
        let kind: MilestoneKind = serde_json::from_str("\"mdl_formation\"").unwrap();
        assert_eq!(kind, MilestoneKind::MdlFormed);
        let kind: MilestoneKind = serde_json::from_str("\"first_filing\"").unwrap();
        assert_eq!(kind, MilestoneKind::FirstFiling);
    }

    #[test]
    fn test_first_milestone_picks_earliest_of_kind() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        let milestones = vec![
            LitigationMilestone::new("Essure", MilestoneKind::FirstFiling, d(2016, 3, 1)),
            LitigationMilestone::new("Essure", MilestoneKind::Recall, d(2015, 1, 1)),
            LitigationMilestone::new("Essure", MilestoneKind::FirstFiling, d(2014, 6, 1)),
        ];
        let first = first_milestone(&milestones, MilestoneKind::FirstFiling).unwrap();
        assert_eq!(first.date, d(2014, 6, 1));
        assert!(first_milestone(&milestones, MilestoneKind::Settlement).is_none());
    }

    #[test]
    fn test_record_month() {
        let record = EventRecord {
            device: DeviceId::new("Essure"),
            report_number: None,
            received: NaiveDate::from_ymd_opt(2017, 8, 31).unwrap(),
            event_date: None,
            outcome: OutcomeCategory::Injury,
            reporter: ReporterType::Patient,
        };
        assert_eq!(record.month(), YearMonth::new(2017, 8).unwrap());
    }
}
