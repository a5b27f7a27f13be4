//! W3C datetime validation for sitemap `lastmod` values.
//!
//! The Sitemap Protocol accepts the W3C datetime profile: bare year,
//! year-month, full date, and full date+time with optional fractional
//! seconds and a `Z` or `±hh:mm` offset. Grammar mismatch and
//! impossible-calendar-date are reported as distinct issues.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static W3C_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})(?:-(\d{2})(?:-(\d{2})(?:[Tt](\d{2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?([Zz]|[+-]\d{2}:\d{2}))?)?)?$",
    )
    .unwrap()
});

/// How precise a valid value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePrecision {
    Year,
    YearMonth,
    Day,
    Timestamp,
}

impl DatePrecision {
    /// Bare year and year-month are valid but advisory-level vague.
    pub fn is_generic(self) -> bool {
        matches!(self, DatePrecision::Year | DatePrecision::YearMonth)
    }
}

/// Why a value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateIssue {
    /// The string does not match the W3C datetime grammar at all.
    InvalidFormat,
    /// Grammar matched but the value is not a real calendar date/time.
    InvalidDate,
}

/// Validate a `lastmod` value against the W3C datetime profile.
pub fn check_w3c_datetime(input: &str) -> Result<DatePrecision, DateIssue> {
    let caps = W3C_RE.captures(input).ok_or(DateIssue::InvalidFormat)?;

    let year: i32 = caps[1].parse().map_err(|_| DateIssue::InvalidDate)?;

    let Some(month) = caps.get(2) else {
        return Ok(DatePrecision::Year);
    };
    let month: u32 = month.as_str().parse().map_err(|_| DateIssue::InvalidDate)?;
    if !(1..=12).contains(&month) {
        return Err(DateIssue::InvalidDate);
    }

    let Some(day) = caps.get(3) else {
        return Ok(DatePrecision::YearMonth);
    };
    let day: u32 = day.as_str().parse().map_err(|_| DateIssue::InvalidDate)?;
    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(DateIssue::InvalidDate);
    }

    let Some(hour) = caps.get(4) else {
        return Ok(DatePrecision::Day);
    };
    let hour: u32 = hour.as_str().parse().map_err(|_| DateIssue::InvalidDate)?;
    let minute: u32 = caps[5].parse().map_err(|_| DateIssue::InvalidDate)?;
    let second: u32 = caps
        .get(6)
        .map(|m| m.as_str().parse())
        .transpose()
        .map_err(|_| DateIssue::InvalidDate)?
        .unwrap_or(0);
    if hour > 23 || minute > 59 || second > 59 {
        return Err(DateIssue::InvalidDate);
    }

    if let Some(offset) = caps.get(7) {
        let offset = offset.as_str();
        if offset.len() == 6 {
            let hh: u32 = offset[1..3].parse().map_err(|_| DateIssue::InvalidDate)?;
            let mm: u32 = offset[4..6].parse().map_err(|_| DateIssue::InvalidDate)?;
            if hh > 23 || mm > 59 {
                return Err(DateIssue::InvalidDate);
            }
        }
    }

    Ok(DatePrecision::Timestamp)
}
