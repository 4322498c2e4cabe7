//! Test helper functions for creating test data.
//!
//! | Helper | Purpose |
//! |--------|---------|
//! | [`record`] | One normalized record from a compact date |
//! | [`MonthSpec`] | Per-month outcome and reporter counts |
//! | [`build_series`] | Contiguous bucket series from month specs |
//! | [`records_for`] | Records that aggregate to a given month spec |
//! | [`milestone`] | A dated litigation milestone |

use crate::aggregation::MonthlyBucket;
use crate::core::{
    DeviceId, EventRecord, LitigationMilestone, MilestoneKind, OutcomeCategory, ReporterType,
    YearMonth,
};
use crate::normalize::parse_compact_date;
use chrono::NaiveDate;

/// Month constructor for tests. Panics on an invalid month.
pub fn ym(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap_or_else(|| panic!("invalid month {year}-{month}"))
}

/// Date constructor for tests. Panics on an invalid date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid date {year}-{month}-{day}"))
}

/// Build a record received on `yyyymmdd`.
pub fn record(
    device: &str,
    yyyymmdd: &str,
    outcome: OutcomeCategory,
    reporter: ReporterType,
) -> EventRecord {
    let received = parse_compact_date(yyyymmdd)
        .unwrap_or_else(|| panic!("invalid compact date {yyyymmdd}"));
    EventRecord {
        device: DeviceId::new(device),
        report_number: None,
        received,
        event_date: None,
        outcome,
        reporter,
    }
}

pub fn milestone(device: &str, kind: MilestoneKind, on: NaiveDate) -> LitigationMilestone {
    LitigationMilestone::new(device, kind, on)
}

/// Counts for one month. The first `patient` reports are patient-filed,
/// the rest healthcare-filed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthSpec {
    pub death: u32,
    pub injury: u32,
    pub malfunction: u32,
    pub other: u32,
    pub patient: u32,
}

impl MonthSpec {
    pub const EMPTY: MonthSpec = MonthSpec {
        death: 0,
        injury: 0,
        malfunction: 0,
        other: 0,
        patient: 0,
    };

    pub fn malfunctions(count: u32) -> Self {
        Self {
            malfunction: count,
            ..Self::EMPTY
        }
    }

    pub fn others(count: u32) -> Self {
        Self {
            other: count,
            ..Self::EMPTY
        }
    }

    pub fn deaths(mut self, count: u32) -> Self {
        self.death = count;
        self
    }

    pub fn injuries(mut self, count: u32) -> Self {
        self.injury = count;
        self
    }

    pub fn patients(mut self, count: u32) -> Self {
        self.patient = count;
        self
    }

    pub fn total(&self) -> u32 {
        self.death + self.injury + self.malfunction + self.other
    }

    fn outcomes(&self) -> impl Iterator<Item = OutcomeCategory> {
        std::iter::repeat_n(OutcomeCategory::Death, self.death as usize)
            .chain(std::iter::repeat_n(OutcomeCategory::Injury, self.injury as usize))
            .chain(std::iter::repeat_n(
                OutcomeCategory::Malfunction,
                self.malfunction as usize,
            ))
            .chain(std::iter::repeat_n(OutcomeCategory::Other, self.other as usize))
    }
}

/// Records received on the 15th of `month` that aggregate to `spec`.
pub fn records_for(device: &str, month: YearMonth, spec: MonthSpec) -> Vec<EventRecord> {
    let received = month.first_day() + chrono::Days::new(14);
    spec.outcomes()
        .enumerate()
        .map(|(i, outcome)| EventRecord {
            device: DeviceId::new(device),
            report_number: Some(format!("{}-{}-{:05}", device, month, i)),
            received,
            event_date: None,
            outcome,
            reporter: if (i as u32) < spec.patient {
                ReporterType::Patient
            } else {
                ReporterType::Healthcare
            },
        })
        .collect()
}

/// Contiguous series starting at `start`, one bucket per spec.
pub fn build_series(device: &str, start: YearMonth, specs: &[MonthSpec]) -> Vec<MonthlyBucket> {
    let months = std::iter::successors(Some(start), |m| m.succ());
    specs
        .iter()
        .zip(months)
        .map(|(spec, month)| {
            let mut bucket = MonthlyBucket::empty(DeviceId::new(device), month);
            for record in records_for(device, month, *spec) {
                bucket.add_record(&record);
            }
            bucket
        })
        .collect()
}
