use crate::components::google_calendar::filters::{str_day, str_day_month, str_hour};
use crate::components::google_calendar::{BucketedSchedule, CalendarEvent};
use crate::utils::time::day_start_iso;
use askama::Template;
use chrono::{FixedOffset, NaiveDate};

/// One event as the templates show it
#[derive(Debug, Clone)]
pub struct EventView {
    pub summary: String,
    pub location: String,
    pub description: String,
    /// Empty for all-day events
    pub start_hour: String,
    pub end_hour: String,
}

impl EventView {
    pub fn new(event: &CalendarEvent, offset: FixedOffset) -> Self {
        let hour = |value: Option<&str>| str_hour(value.unwrap_or(""), offset);

        Self {
            summary: event
                .summary
                .clone()
                .unwrap_or_else(|| "Unnamed event".to_string()),
            location: event.location.clone().unwrap_or_default(),
            description: event.description.clone().unwrap_or_default(),
            start_hour: hour(event.start.date_time.as_deref()),
            end_hour: hour(event.end.as_ref().and_then(|end| end.date_time.as_deref())),
        }
    }

    pub fn is_all_day(&self) -> bool {
        self.start_hour.is_empty()
    }
}

/// Header and events for one day
#[derive(Debug, Clone)]
pub struct DayView {
    pub day: String,
    pub month: String,
    pub weekday: String,
    pub events: Vec<EventView>,
}

impl DayView {
    pub fn new(date: NaiveDate, events: &[CalendarEvent], offset: FixedOffset) -> Self {
        // Headers go through the same filters as event times
        let midnight = day_start_iso(date, offset);
        let day_month = str_day_month(&midnight, offset);
        let (month_day, weekday) = day_month.split_once('|').unwrap_or((day_month.as_str(), ""));
        let month = month_day.split(' ').next().unwrap_or(month_day);

        Self {
            day: str_day(&midnight, offset),
            month: month.to_string(),
            weekday: weekday.to_string(),
            events: events.iter().map(|e| EventView::new(e, offset)).collect(),
        }
    }
}

/// Day views for every bucket, empty days included
pub fn schedule_view(schedule: &BucketedSchedule, offset: FixedOffset) -> Vec<DayView> {
    schedule
        .days
        .iter()
        .map(|bucket| DayView::new(bucket.date, &bucket.events, offset))
        .collect()
}

/// Full billboard page
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub title: &'a str,
    /// False when no events could be fetched or grouped
    pub available: bool,
    /// Shown events come from an earlier fetch
    pub stale: bool,
    pub days: Vec<DayView>,
    /// Whether the page polls for changes
    pub poll: bool,
}

/// The event list alone, sent to polling browsers when something changed
#[derive(Template)]
#[template(path = "events_sorted.html")]
pub struct EventsPartial {
    pub available: bool,
    pub days: Vec<DayView>,
}
