//! Calendar-month key used to bucket reports.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A calendar month, stored as the first day of that month.
///
/// Ordering is chronological. Serialized as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// Build a month from year and 1-based month number.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// Truncate a date to its month.
    pub fn from_date(date: NaiveDate) -> Self {
        // Day 1 always exists for a month that already contains `date`.
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    /// First calendar day of the month.
    pub fn first_day(self) -> NaiveDate {
        self.0
    }

    /// Last calendar day of the month.
    pub fn last_day(self) -> NaiveDate {
        self.succ()
            .and_then(|next| next.0.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// The following month, `None` at the end of the representable calendar.
    pub fn succ(self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    /// Signed number of months from `self` to `later`.
    pub fn months_until(self, later: YearMonth) -> i64 {
        let years = i64::from(later.year()) - i64::from(self.year());
        years * 12 + i64::from(later.month()) - i64::from(self.month())
    }

    /// Whether `date` falls inside this month.
    pub fn contains(self, date: NaiveDate) -> bool {
        YearMonth::from_date(date) == self
    }

    /// Inclusive range of months `[start, end]`; empty when `start > end`.
    pub fn range_inclusive(start: YearMonth, end: YearMonth) -> Vec<YearMonth> {
        std::iter::successors(Some(start), |m| m.succ())
            .take_while(|m| *m <= end)
            .collect()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in '{}'", s))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_from_date_truncates() {
        let date = NaiveDate::from_ymd_opt(2019, 7, 23).unwrap();
        assert_eq!(YearMonth::from_date(date), ym(2019, 7));
    }

    #[test]
    fn test_succ_rolls_year() {
        assert_eq!(ym(2019, 12).succ(), Some(ym(2020, 1)));
    }

    #[test]
    fn test_last_day_handles_leap_year() {
        assert_eq!(
            ym(2020, 2).last_day(),
            NaiveDate::from_ymd_opt(2020, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_months_until_is_signed() {
        assert_eq!(ym(2019, 11).months_until(ym(2020, 2)), 3);
        assert_eq!(ym(2020, 2).months_until(ym(2019, 11)), -3);
    }

    #[test]
    fn test_range_inclusive() {
        let range = YearMonth::range_inclusive(ym(2019, 11), ym(2020, 2));
        assert_eq!(range.len(), 4);
        assert!(YearMonth::range_inclusive(ym(2020, 2), ym(2019, 11)).is_empty());
    }

    #[test]
    fn test_parse_and_display() {
        let month: YearMonth = "2021-03".parse().unwrap();
        assert_eq!(month.to_string(), "2021-03");
        assert!("2021-13".parse::<YearMonth>().is_err());
        assert!("202103".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ym(2018, 5)).unwrap();
        assert_eq!(json, "\"2018-05\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym(2018, 5));
    }
}
