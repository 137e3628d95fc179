//! Date/time parsing for export values
//!
//! Exports mix several textual date layouts. Candidates are tried in a fixed
//! order and the first one that parses wins. Values without zone information
//! are read as UTC.

use super::errors::DateParseError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Zone-less layouts, tried before the ISO instant form.
const LOCAL_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S", // 2023-01-15 14:30:00
    "%H:%M:%S %d-%m-%Y", // 14:30:00 15-01-2023
    "%d.%m.%Y %H:%M:%S", // 15.01.2023 14:30:00
    "%Y/%m/%d %H:%M:%S", // 2023/01/15 14:30:00
    "%m-%d-%Y %H:%M:%S", // 01-15-2023 14:30:00
    "%Y-%m-%dT%H:%M:%S", // 2023-01-15T14:30:00
];

/// ISO local date-time with optional fractional seconds.
const ISO_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub fn parse_to_instant(input: &str) -> Result<DateTime<Utc>, DateParseError> {
    let error = || DateParseError {
        input: input.to_string(),
    };
    if input.trim().is_empty() {
        return Err(error());
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, ISO_LOCAL_FORMAT) {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    Err(error())
}
