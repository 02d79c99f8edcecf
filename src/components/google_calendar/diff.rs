use super::models::{CalendarEvent, EventSnapshot, EventTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Event attributes monitored for changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchedField {
    Start,
    End,
    Summary,
    Location,
    Description,
}

impl WatchedField {
    pub const ALL: [WatchedField; 5] = [
        WatchedField::Start,
        WatchedField::End,
        WatchedField::Summary,
        WatchedField::Location,
        WatchedField::Description,
    ];
}

/// Value of a watched field on one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Time(&'a EventTime),
    Text(&'a str),
}

impl CalendarEvent {
    /// The value of `field`, or `None` when the event does not carry it
    pub fn watched(&self, field: WatchedField) -> Option<FieldValue<'_>> {
        match field {
            WatchedField::Start => Some(FieldValue::Time(&self.start)),
            WatchedField::End => self.end.as_ref().map(FieldValue::Time),
            WatchedField::Summary => self.summary.as_deref().map(FieldValue::Text),
            WatchedField::Location => self.location.as_deref().map(FieldValue::Text),
            WatchedField::Description => self.description.as_deref().map(FieldValue::Text),
        }
    }
}

/// Whether any event in `events` carries `field` with `value`
fn find_event_property(field: WatchedField, value: FieldValue<'_>, events: &EventSnapshot) -> bool {
    events.iter().any(|event| event.watched(field) == Some(value))
}

/// Returns true when nothing significant changed between two snapshots.
///
/// The check is per field, not per event: each watched value of every previous
/// event only has to appear on *some* current event. If two events share a
/// value and only one of them changes, or two events swap values, the change
/// goes unnoticed. Use [`snapshots_match_by_id`] when that matters.
pub fn snapshots_match(previous: &EventSnapshot, current: &EventSnapshot) -> bool {
    if previous.len() != current.len() {
        return false;
    }

    previous.iter().all(|event| {
        WatchedField::ALL.iter().all(|&field| match event.watched(field) {
            Some(value) => find_event_property(field, value, current),
            None => true,
        })
    })
}

/// Returns true when every previous event still exists under the same id with
/// the same watched fields.
pub fn snapshots_match_by_id(previous: &EventSnapshot, current: &EventSnapshot) -> bool {
    if previous.len() != current.len() {
        return false;
    }

    previous.iter().all(|old| {
        current
            .iter()
            .find(|new| new.id == old.id)
            .is_some_and(|new| {
                WatchedField::ALL
                    .iter()
                    .all(|&field| old.watched(field) == new.watched(field))
            })
    })
}

/// Rule used to decide whether the browser needs a re-render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDetection {
    /// Watched values only need to appear somewhere in the new snapshot
    #[default]
    FieldMembership,
    /// Events are matched by their source id and compared field by field
    EventIdentity,
}

impl ChangeDetection {
    /// Returns true when no change is detected
    pub fn snapshots_match(self, previous: &EventSnapshot, current: &EventSnapshot) -> bool {
        match self {
            ChangeDetection::FieldMembership => snapshots_match(previous, current),
            ChangeDetection::EventIdentity => snapshots_match_by_id(previous, current),
        }
    }
}

impl FromStr for ChangeDetection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "field" | "field_membership" => Ok(ChangeDetection::FieldMembership),
            "identity" | "event_identity" => Ok(ChangeDetection::EventIdentity),
            other => Err(format!("Unknown change detection '{}'", other)),
        }
    }
}

impl fmt::Display for ChangeDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeDetection::FieldMembership => write!(f, "field"),
            ChangeDetection::EventIdentity => write!(f, "identity"),
        }
    }
}
