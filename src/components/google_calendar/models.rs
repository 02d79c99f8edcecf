use crate::error::{FetchError, ParseError};
use crate::utils::time::{parse_event_date, parse_event_time};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Start or end of an event, as the calendar API sends it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    /// Timestamp for timed events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// Date for all-day events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    /// A timed value such as `2024-03-01T09:00:00-06:00`
    pub fn at(date_time: &str) -> Self {
        Self {
            date_time: Some(date_time.to_string()),
            ..Default::default()
        }
    }

    /// An all-day value such as `2024-03-01`
    pub fn on(date: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    /// The calendar day this time falls on at `offset`
    pub fn local_date(&self, offset: FixedOffset) -> Result<Option<NaiveDate>, ParseError> {
        if let Some(date_time) = &self.date_time {
            Ok(Some(parse_event_time(date_time, offset)?.date_naive()))
        } else if let Some(date) = &self.date {
            Ok(Some(parse_event_date(date)?))
        } else {
            Ok(None)
        }
    }
}

/// A single event from the calendar, never modified after it is fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    pub start: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CalendarEvent {
    /// Day the event starts on at `offset`
    pub fn start_date(&self, offset: FixedOffset) -> Result<NaiveDate, ParseError> {
        self.start
            .local_date(offset)?
            .ok_or_else(|| ParseError::MissingStart(self.id.clone()))
    }
}

/// Events known after one fetch, in the order the API returned them
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventSnapshot {
    events: Vec<CalendarEvent>,
}

impl EventSnapshot {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }

    /// Build a snapshot from the decoded events response.
    ///
    /// Items that do not look like events (no `start`, wrong shape) are
    /// skipped so one bad record does not hide the rest of the calendar.
    pub fn from_payload(payload: &Value) -> Result<Self, FetchError> {
        let items = payload
            .get("items")
            .and_then(|items| items.as_array())
            .ok_or(FetchError::MissingItems)?;

        let events = items
            .iter()
            .filter_map(|item| match CalendarEvent::deserialize(item) {
                Ok(event) => Some(event),
                Err(e) => {
                    let id = item.get("id").and_then(|id| id.as_str()).unwrap_or("<no id>");
                    warn!("Skipping calendar item {}: {}", id, e);
                    None
                }
            })
            .collect();

        Ok(Self { events })
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CalendarEvent> {
        self.events.iter()
    }

    pub fn into_events(self) -> Vec<CalendarEvent> {
        self.events
    }
}

impl From<Vec<CalendarEvent>> for EventSnapshot {
    fn from(events: Vec<CalendarEvent>) -> Self {
        Self::new(events)
    }
}

impl<'a> IntoIterator for &'a EventSnapshot {
    type Item = &'a CalendarEvent;
    type IntoIter = std::slice::Iter<'a, CalendarEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// The raw payload and the events derived from it, always stored together
#[derive(Debug, Clone)]
pub struct CachedFetch {
    pub raw: Value,
    pub events: EventSnapshot,
    pub fetched_at: DateTime<Utc>,
}
