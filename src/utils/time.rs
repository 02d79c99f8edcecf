use crate::error::ParseError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Offset the calendar API is queried and answered in unless configured otherwise
pub const DEFAULT_UTC_OFFSET: &str = "-06:00";

/// Timestamp body the calendar API uses, without the trailing offset
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse an offset in ±HH:MM format
pub fn parse_offset(value: &str) -> Result<FixedOffset, ParseError> {
    let invalid = || ParseError::InvalidOffset(value.to_string());

    let (sign, rest) = match value.as_bytes().first() {
        Some(b'+') => (1, &value[1..]),
        Some(b'-') => (-1, &value[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let two_digits = |field: &str| field.len() == 2 && field.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(invalid());
    }
    let hours = hours.parse::<i32>().map_err(|_| invalid())?;
    let minutes = minutes.parse::<i32>().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Render an offset as ±HH:MM, the way the calendar API writes it
pub fn format_offset(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// Parse a calendar timestamp such as `2024-03-01T09:00:00-06:00`.
///
/// Only the configured offset is accepted; a timestamp in any other zone is
/// rejected instead of being shifted. With a zero offset the `Z` suffix is
/// accepted as well.
pub fn parse_event_time(value: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>, ParseError> {
    let expected = format_offset(offset);

    let body = value
        .strip_suffix(expected.as_str())
        .or_else(|| {
            if offset.local_minus_utc() == 0 {
                value.strip_suffix('Z')
            } else {
                None
            }
        })
        .ok_or_else(|| ParseError::OffsetMismatch {
            value: value.to_string(),
            expected: expected.clone(),
        })?;

    let naive = NaiveDateTime::parse_from_str(body, TIMESTAMP_FORMAT).map_err(|e| {
        ParseError::Malformed {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| ParseError::Malformed {
            value: value.to_string(),
            reason: "not a valid local time".to_string(),
        })
}

/// Parse an all-day event date in YYYY-MM-DD format
pub fn parse_event_date(value: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| ParseError::Malformed {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Midnight of `date` at `offset`, formatted for the timeMin/timeMax query parameters
pub fn day_start_iso(date: NaiveDate, offset: FixedOffset) -> String {
    format!("{}T00:00:00{}", date.format("%Y-%m-%d"), format_offset(offset))
}

/// The current date as seen at `offset`
pub fn today_at(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}
