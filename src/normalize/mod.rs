//! Event record normalization.
//!
//! Converts loosely-shaped raw report objects (openFDA/MAUDE JSON) into
//! [`EventRecord`]s. Records with an unusable received date or no resolvable
//! device are rejected and tallied, never merged into a bucket.

pub mod reporter;

pub use reporter::classify_reporter;

use crate::core::{DeviceId, DeviceRegistry, EventRecord, OutcomeCategory};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

const RECEIVED_DATE_FIELD: &str = "date_received";
const EVENT_DATE_FIELD: &str = "date_of_event";
const EVENT_TYPE_FIELD: &str = "event_type";
const DEVICE_ID_FIELDS: &[&str] = &["device_id", "device"];
const REPORT_NUMBER_FIELDS: &[&str] = &["report_number", "mdr_report_key"];

/// Why a raw report could not become an [`EventRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("malformed date in '{field}': '{value}' (expected YYYYMMDD)")]
    MalformedDate { field: &'static str, value: String },

    #[error("missing required field '{field}'")]
    MissingDate { field: &'static str },

    #[error("report does not identify a device")]
    MissingDevice,
}

/// A raw report as supplied by the fetch layer: arbitrary optional fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawReport(Map<String, Value>);

impl RawReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Wrap a JSON value; non-objects yield `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Text of a field. Numbers are rendered, arrays yield their first scalar.
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(scalar_text)
    }

    /// First non-empty text among `keys`.
    pub fn first_text(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.text(key))
            .find(|text| !text.trim().is_empty())
    }

    /// Brand and generic names from the nested `device[]` entries.
    fn nested_device_names(&self) -> Vec<String> {
        let Some(Value::Array(entries)) = self.0.get("device") else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(Value::as_object)
            .flat_map(|entry| {
                ["brand_name", "generic_name"]
                    .into_iter()
                    .filter_map(|key| entry.get(key).and_then(scalar_text))
            })
            .filter(|name| !name.trim().is_empty())
            .collect()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => items.iter().find_map(scalar_text),
        _ => None,
    }
}

/// Parse a fixed-width `YYYYMMDD` date.
pub fn parse_compact_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = text[0..4].parse().ok()?;
    let month = text[4..6].parse().ok()?;
    let day = text[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse the received date; the only date that may reject a record.
pub fn parse_received_date(raw: &RawReport) -> Result<NaiveDate, NormalizeError> {
    let value = raw
        .text(RECEIVED_DATE_FIELD)
        .filter(|v| !v.trim().is_empty())
        .ok_or(NormalizeError::MissingDate {
            field: RECEIVED_DATE_FIELD,
        })?;
    parse_compact_date(&value).ok_or(NormalizeError::MalformedDate {
        field: RECEIVED_DATE_FIELD,
        value,
    })
}

/// Classify event-type text with fixed precedence Death > Injury > Malfunction.
///
/// Matching is case-insensitive. Non-empty text matching none of the three is
/// `Other`; absent or blank text is `Unknown`.
pub fn classify_outcome(event_type: Option<&str>) -> OutcomeCategory {
    let text = match event_type.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_lowercase(),
        _ => return OutcomeCategory::Unknown,
    };

    if text.contains("death") {
        OutcomeCategory::Death
    } else if text.contains("injury") {
        OutcomeCategory::Injury
    } else if text.contains("malfunction") {
        OutcomeCategory::Malfunction
    } else {
        OutcomeCategory::Other
    }
}

/// Normalize one raw report for an already-resolved device.
pub fn normalize_report(raw: &RawReport, device: DeviceId) -> Result<EventRecord, NormalizeError> {
    let received = parse_received_date(raw)?;
    let event_date = raw
        .text(EVENT_DATE_FIELD)
        .and_then(|text| parse_compact_date(&text));
    let event_type = raw.text(EVENT_TYPE_FIELD);
    let reporter_code = raw.first_text(reporter::REPORTER_FIELDS);

    Ok(EventRecord {
        device,
        report_number: raw.first_text(REPORT_NUMBER_FIELDS),
        received,
        event_date,
        outcome: classify_outcome(event_type.as_deref()),
        reporter: classify_reporter(reporter_code.as_deref()),
    })
}

/// Resolve which device a raw report belongs to.
///
/// An explicit identifier creates the device on first reference. Nested
/// brand/generic names only match devices already in the registry. The
/// caller's default applies to per-device input streams.
pub fn resolve_device(
    raw: &RawReport,
    registry: &mut DeviceRegistry,
    default_device: Option<&DeviceId>,
) -> Result<DeviceId, NormalizeError> {
    let explicit = DEVICE_ID_FIELDS
        .iter()
        .filter_map(|key| match raw.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        })
        .next();
    if let Some(identifier) = explicit {
        return Ok(registry.get_or_create(identifier));
    }

    if let Some(device) = raw
        .nested_device_names()
        .iter()
        .find_map(|name| registry.resolve_text(name))
    {
        return Ok(device);
    }

    match default_device {
        Some(device) => Ok(registry.get_or_create(device.as_str())),
        None => Err(NormalizeError::MissingDevice),
    }
}

/// Counts of rejected raw reports by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionTally {
    pub malformed_date: usize,
    pub missing_date: usize,
    pub missing_device: usize,
}

impl RejectionTally {
    pub fn record(&mut self, error: &NormalizeError) {
        match error {
            NormalizeError::MalformedDate { .. } => self.malformed_date += 1,
            NormalizeError::MissingDate { .. } => self.missing_date += 1,
            NormalizeError::MissingDevice => self.missing_device += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.malformed_date + self.missing_date + self.missing_device
    }

    pub fn merge(&mut self, other: &RejectionTally) {
        self.malformed_date += other.malformed_date;
        self.missing_date += other.missing_date;
        self.missing_device += other.missing_device;
    }
}

/// Output of batch normalization: valid records plus the rejected tally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedBatch {
    pub records: Vec<EventRecord>,
    pub rejected: RejectionTally,
}

/// Normalize a batch, skipping and tallying failures.
pub fn normalize_batch(
    raws: &[RawReport],
    registry: &mut DeviceRegistry,
    default_device: Option<&DeviceId>,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for raw in raws {
        // Date first: a rejected record never registers a device.
        let result = parse_received_date(raw)
            .and_then(|_| resolve_device(raw, registry, default_device))
            .and_then(|device| normalize_report(raw, device));
        match result {
            Ok(record) => batch.records.push(record),
            Err(error) => {
                debug!(%error, "rejected raw report");
                batch.rejected.record(&error);
            }
        }
    }

    if batch.rejected.total() > 0 {
        warn!(
            accepted = batch.records.len(),
            rejected = batch.rejected.total(),
            malformed_date = batch.rejected.malformed_date,
            "some raw reports were rejected during normalization"
        );
    }

    batch
}
