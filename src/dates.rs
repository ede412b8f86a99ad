//! Calendar windows used to page backwards through the feed.

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::error::{AppError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Current calendar date on the server's local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `n` consecutive dates starting at `base` and walking backwards one day at a time.
pub fn last_n_dates(n: usize, base: NaiveDate) -> Vec<String> {
    (0..n)
        .map(|offset| format_date(base - Duration::days(offset as i64)))
        .collect()
}

/// Earliest date covered by a window of `n` dates ending at `base`.
pub fn window_start(n: usize, base: NaiveDate) -> NaiveDate {
    base - Duration::days(n.saturating_sub(1) as i64)
}

/// Resolve a `lastDate` query value. Missing or blank values fall back to `today`.
pub fn parse_base_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    let value = match raw.map(str::trim) {
        None | Some("") => return Ok(today),
        Some(value) => value,
    };

    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.date_naive());
    }

    Err(AppError::InvalidDate(value.to_string()))
}
