//! Monthly aggregation of normalized reports.
//!
//! Produces a contiguous, chronologically ordered series of [`MonthlyBucket`]s
//! per device. Months without reports are materialized with zero counts so
//! window arithmetic downstream can index by position.

use crate::core::{DeviceId, EventRecord, OutcomeCategory, ReporterType, YearMonth};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Report counts per outcome category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub death: u32,
    pub injury: u32,
    pub malfunction: u32,
    pub other: u32,
    pub unknown: u32,
}

impl OutcomeCounts {
    pub fn get(&self, category: OutcomeCategory) -> u32 {
        match category {
            OutcomeCategory::Death => self.death,
            OutcomeCategory::Injury => self.injury,
            OutcomeCategory::Malfunction => self.malfunction,
            OutcomeCategory::Other => self.other,
            OutcomeCategory::Unknown => self.unknown,
        }
    }

    fn slot(&mut self, category: OutcomeCategory) -> &mut u32 {
        match category {
            OutcomeCategory::Death => &mut self.death,
            OutcomeCategory::Injury => &mut self.injury,
            OutcomeCategory::Malfunction => &mut self.malfunction,
            OutcomeCategory::Other => &mut self.other,
            OutcomeCategory::Unknown => &mut self.unknown,
        }
    }

    pub fn sum(&self) -> u32 {
        OutcomeCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    pub fn add(&mut self, other: &OutcomeCounts) {
        for category in OutcomeCategory::ALL {
            *self.slot(category) += other.get(category);
        }
    }
}

/// Report counts per reporter type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReporterCounts {
    pub patient: u32,
    pub healthcare: u32,
    pub manufacturer: u32,
    pub other: u32,
}

impl ReporterCounts {
    pub fn get(&self, reporter: ReporterType) -> u32 {
        match reporter {
            ReporterType::Patient => self.patient,
            ReporterType::Healthcare => self.healthcare,
            ReporterType::Manufacturer => self.manufacturer,
            ReporterType::Other => self.other,
        }
    }

    fn slot(&mut self, reporter: ReporterType) -> &mut u32 {
        match reporter {
            ReporterType::Patient => &mut self.patient,
            ReporterType::Healthcare => &mut self.healthcare,
            ReporterType::Manufacturer => &mut self.manufacturer,
            ReporterType::Other => &mut self.other,
        }
    }

    pub fn sum(&self) -> u32 {
        ReporterType::ALL.iter().map(|r| self.get(*r)).sum()
    }

    pub fn add(&mut self, other: &ReporterCounts) {
        for reporter in ReporterType::ALL {
            *self.slot(reporter) += other.get(reporter);
        }
    }
}

/// Aggregate counts for one device and one calendar month.
///
/// `total` always equals `outcomes.sum()`; buckets are only built through
/// [`MonthlyBucket::empty`] and [`MonthlyBucket::add_record`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub device: DeviceId,
    pub month: YearMonth,
    pub outcomes: OutcomeCounts,
    pub reporters: ReporterCounts,
    pub total: u32,
}

impl MonthlyBucket {
    pub fn empty(device: DeviceId, month: YearMonth) -> Self {
        Self {
            device,
            month,
            outcomes: OutcomeCounts::default(),
            reporters: ReporterCounts::default(),
            total: 0,
        }
    }

    pub fn add_record(&mut self, record: &EventRecord) {
        *self.outcomes.slot(record.outcome) += 1;
        *self.reporters.slot(record.reporter) += 1;
        self.total += 1;
    }

    pub fn is_consistent(&self) -> bool {
        self.total == self.outcomes.sum() && self.total == self.reporters.sum()
    }
}

/// Build the contiguous monthly series for `device` from `records`.
///
/// Records for other devices are ignored. No matching records yields an
/// empty series, which callers must treat as insufficient data.
pub fn aggregate_monthly(device: &DeviceId, records: &[EventRecord]) -> Vec<MonthlyBucket> {
    aggregate_monthly_through(device, records, None)
}

/// Like [`aggregate_monthly`], padding with zero buckets up to `extend_to`.
///
/// Padding never creates a series for a device with no records.
pub fn aggregate_monthly_through(
    device: &DeviceId,
    records: &[EventRecord],
    extend_to: Option<YearMonth>,
) -> Vec<MonthlyBucket> {
    let mut by_month: BTreeMap<YearMonth, MonthlyBucket> = BTreeMap::new();
    for record in records.iter().filter(|r| &r.device == device) {
        let month = record.month();
        by_month
            .entry(month)
            .or_insert_with(|| MonthlyBucket::empty(device.clone(), month))
            .add_record(record);
    }

    let (Some(first), Some(last)) = (
        by_month.keys().next().copied(),
        by_month.keys().next_back().copied(),
    ) else {
        debug!(device = %device, "no valid records; empty series");
        return Vec::new();
    };
    let end = extend_to.map_or(last, |target| target.max(last));

    let series: Vec<MonthlyBucket> = YearMonth::range_inclusive(first, end)
        .into_iter()
        .map(|month| {
            by_month
                .remove(&month)
                .unwrap_or_else(|| MonthlyBucket::empty(device.clone(), month))
        })
        .collect();

    debug!(
        device = %device,
        months = series.len(),
        first = %first,
        last = %end,
        "aggregated monthly series"
    );
    series
}

/// Group records by device and aggregate each device's series.
pub fn aggregate_by_device(records: &[EventRecord]) -> BTreeMap<DeviceId, Vec<MonthlyBucket>> {
    let mut grouped: BTreeMap<DeviceId, Vec<EventRecord>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.device.clone())
            .or_default()
            .push(record.clone());
    }
    grouped
        .into_iter()
        .map(|(device, device_records)| {
            let series = aggregate_monthly(&device, &device_records);
            (device, series)
        })
        .collect()
}

/// Sum of totals across a slice of buckets.
pub fn window_total(buckets: &[MonthlyBucket]) -> u32 {
    buckets.iter().map(|b| b.total).sum()
}

/// Charting-oriented summary of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub first_month: YearMonth,
    pub last_month: YearMonth,
    pub months: usize,
    pub total_reports: u32,
    pub peak_month: YearMonth,
    pub peak_total: u32,
    pub outcomes: OutcomeCounts,
    pub reporters: ReporterCounts,
}

/// Summarize a series; `None` for an empty series.
pub fn summarize_series(series: &[MonthlyBucket]) -> Option<SeriesSummary> {
    let first = series.first()?;
    let last = series.last()?;
    // Earliest month wins ties so the summary is stable.
    let peak = series
        .iter()
        .fold(first, |best, b| if b.total > best.total { b } else { best });

    let mut outcomes = OutcomeCounts::default();
    let mut reporters = ReporterCounts::default();
    for bucket in series {
        outcomes.add(&bucket.outcomes);
        reporters.add(&bucket.reporters);
    }

    Some(SeriesSummary {
        first_month: first.month,
        last_month: last.month,
        months: series.len(),
        total_reports: window_total(series),
        peak_month: peak.month,
        peak_total: peak.total,
        outcomes,
        reporters,
    })
}
