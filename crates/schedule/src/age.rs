//! Calendar-month age arithmetic.
//!
//! Age is the difference in calendar months, ignoring day-of-month: a child
//! born on the 28th is one month old on the 1st of the following month. The
//! calendar thresholds were set against this rule, so it is kept as-is even
//! though it can report a child up to ~30 days older than they are.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Parse a stored date: `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive
/// `YYYY-MM-DDTHH:MM:SS` timestamp. Returns `None` for anything else.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// `(today.year - birth.year) * 12 + (today.month - birth.month)`.
/// Negative when `birth` is after `today`.
pub fn age_in_months(birth: NaiveDate, today: NaiveDate) -> i32 {
    (today.year() - birth.year()) * 12 + (today.month() as i32 - birth.month() as i32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildAge {
    Known(i32),
    /// Birth date missing or unparseable. Nothing is ever overdue.
    Unknown,
}

impl ChildAge {
    pub fn from_birth_date(birth: NaiveDate, today: NaiveDate) -> Self {
        Self::Known(age_in_months(birth, today))
    }

    pub fn from_birth_date_str(birth: &str, today: NaiveDate) -> Self {
        match parse_date(birth) {
            Some(d) => Self::from_birth_date(d, today),
            None => Self::Unknown,
        }
    }

    pub fn months(&self) -> Option<i32> {
        match self {
            Self::Known(m) => Some(*m),
            Self::Unknown => None,
        }
    }

    /// True only for a known age strictly greater than `months`.
    pub fn is_past(&self, months: i64) -> bool {
        match self {
            Self::Known(m) => i64::from(*m) > months,
            Self::Unknown => false,
        }
    }
}
