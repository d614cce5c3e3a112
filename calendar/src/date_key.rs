//! Local calendar-day keys for bucketing events.
//!
//! Grouping is by the wall-clock date in the configured zone, never by the
//! UTC date: `2025-11-12T23:30:00-05:00` belongs to the 12th in New York even
//! though the same instant is already the 13th in UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{CalendarError, CalendarResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Date-time layouts carrying an explicit UTC offset, tried after RFC 3339
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Date-time layouts without an offset, read as local wall-clock time
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Canonical `YYYY-MM-DD` key of a local calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| CalendarError::invalid_date(s))
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// Compute the local calendar-day key of an ISO-8601 date or date-time.
///
/// Strings with an offset are converted into `tz` first. Strings without
/// one are taken as already local, and a bare date is that date.
pub fn normalize(input: &str, tz: &Tz) -> CalendarResult<DateKey> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CalendarError::invalid_date(input));
    }

    if let Some(instant) = parse_with_offset(trimmed) {
        return Ok(DateKey(instant.with_timezone(tz).date_naive()));
    }

    if let Some(local) = parse_naive(trimmed) {
        return Ok(DateKey(local.date()));
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map(DateKey)
        .map_err(|_| CalendarError::invalid_date(input))
}

/// Resolve an ISO-8601 string to a wall-clock date-time in `tz`.
///
/// A bare date resolves to local midnight.
pub fn local_datetime(input: &str, tz: &Tz) -> CalendarResult<NaiveDateTime> {
    let trimmed = input.trim();

    if let Some(instant) = parse_with_offset(trimmed) {
        return Ok(instant.with_timezone(tz).naive_local());
    }

    if let Some(local) = parse_naive(trimmed) {
        return Ok(local);
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CalendarError::invalid_date(input))
}

fn parse_with_offset(input: &str) -> Option<DateTime<chrono::FixedOffset>> {
    DateTime::parse_from_rfc3339(input).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(input, format).ok())
    })
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
}
