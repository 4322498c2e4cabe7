//! Testing infrastructure for maude-risk.
//!
//! Builders for records, buckets and milestones so unit and integration
//! tests can describe scenarios by monthly counts instead of hand-writing
//! raw report JSON.
//!
//! # Quick Start
//!
//! ```rust
//! use maude_risk::testkit::helpers::{build_series, ym, MonthSpec};
//!
//! let series = build_series("Essure", ym(2015, 1), &[MonthSpec::malfunctions(5); 12]);
//! assert_eq!(series.len(), 12);
//! assert!(series.iter().all(|b| b.total == 5));
//! ```

pub mod assertions;
pub mod helpers;

pub use helpers::{build_series, date, milestone, record, records_for, ym, MonthSpec};
