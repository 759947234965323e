//! Timezone-aware datetime normalization
//!
//! Client timestamps may or may not carry a UTC offset. An embedded offset
//! always wins; a bare wall-clock value is read in the user's timezone, or
//! as UTC when the user has none configured.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Format shared by every timestamp column in the database
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const WALL_CLOCK_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateTimeError {
    #[error("Invalid date format: {0}")]
    InvalidFormat(String),
}

impl DateTimeError {
    /// The client-supplied text that failed to parse
    pub fn input(&self) -> &str {
        match self {
            DateTimeError::InvalidFormat(input) => input,
        }
    }
}

/// Resolve an IANA zone id. Unknown ids resolve to `None`.
pub fn resolve_timezone(id: &str) -> Option<Tz> {
    match id.trim().parse::<Tz>() {
        Ok(tz) => Some(tz),
        Err(_) => {
            tracing::warn!("Ignoring unknown timezone: {:?}", id);
            None
        }
    }
}

/// Convert a client timestamp into an absolute instant.
pub fn normalize(input: &str, tz: Option<Tz>) -> Result<DateTime<Utc>, DateTimeError> {
    let trimmed = input.trim();
    let invalid = || DateTimeError::InvalidFormat(input.to_string());

    let instant = if has_explicit_offset(trimmed) {
        parse_with_offset(trimmed)
    } else {
        parse_wall_clock(trimmed).and_then(|naive| match tz {
            Some(tz) => localize(naive, tz),
            None => Some(Utc.from_utc_datetime(&naive)),
        })
    };

    // Stored timestamps compare as text, which only orders four-digit years
    instant
        .filter(|dt| STORABLE_YEARS.contains(&dt.year()))
        .ok_or_else(invalid)
}

/// Best-effort variant of [`normalize`] for storage comparisons.
///
/// Absent or malformed input yields `None`.
pub fn to_storage_string(input: Option<&str>, tz: Option<Tz>) -> Option<String> {
    let input = input?;
    normalize(input, tz).ok().map(format_storage)
}

/// Format an instant the way timestamp columns store it
pub fn format_storage(instant: DateTime<Utc>) -> String {
    instant.format(STORAGE_FORMAT).to_string()
}

/// Parse a value previously written with [`format_storage`]
pub fn parse_storage(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, STORAGE_FORMAT)
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn has_explicit_offset(s: &str) -> bool {
    let bytes = s.as_bytes();
    if matches!(bytes.last(), Some(b'Z') | Some(b'z')) {
        return true;
    }
    if bytes.len() < 6 {
        return false;
    }
    let tail = &bytes[bytes.len() - 6..];
    matches!(tail[0], b'+' | b'-')
        && tail[1].is_ascii_digit()
        && tail[2].is_ascii_digit()
        && tail[3] == b':'
        && tail[4].is_ascii_digit()
        && tail[5].is_ascii_digit()
}

fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    let owned;
    let s = match s.strip_suffix(['Z', 'z']) {
        Some(rest) => {
            owned = format!("{}+00:00", rest);
            owned.as_str()
        }
        None => s,
    };

    OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_wall_clock(s: &str) -> Option<NaiveDateTime> {
    WALL_CLOCK_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Read a wall-clock value in `tz`.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times that
/// fall into a gap (clocks going forward) are moved one hour later.
fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<Utc>> {
    let local = match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
    };
    local.map(|dt| dt.with_timezone(&Utc))
}
