//! Display helpers for event timestamps.
//!
//! Each filter takes a timestamp in the calendar's fixed-offset format and
//! returns a display string. Empty or unparseable input comes back unchanged
//! so a page never fails to render because of one odd value.

use crate::utils::time::parse_event_time;
use chrono::{DateTime, FixedOffset};
use tracing::debug;

fn format_or_unchanged<F>(value: &str, offset: FixedOffset, render: F) -> String
where
    F: Fn(DateTime<FixedOffset>) -> String,
{
    if value.is_empty() {
        return value.to_string();
    }

    match parse_event_time(value, offset) {
        Ok(parsed) => render(parsed),
        Err(e) => {
            debug!("Leaving timestamp unformatted: {}", e);
            value.to_string()
        }
    }
}

/// `2024-03-01T09:05:00-06:00` becomes `9:05 AM`
pub fn str_hour(value: &str, offset: FixedOffset) -> String {
    format_or_unchanged(value, offset, |parsed| {
        parsed
            .format("%I:%M %p")
            .to_string()
            .trim_start_matches('0')
            .trim()
            .to_string()
    })
}

/// `2024-03-01T09:05:00-06:00` becomes `01`
pub fn str_day(value: &str, offset: FixedOffset) -> String {
    format_or_unchanged(value, offset, |parsed| parsed.format("%d").to_string())
}

/// `2024-03-01T09:05:00-06:00` becomes `March 01|Friday`
pub fn str_day_month(value: &str, offset: FixedOffset) -> String {
    format_or_unchanged(value, offset, |parsed| {
        parsed.format("%B %d|%A").to_string().trim_matches('0').to_string()
    })
}
