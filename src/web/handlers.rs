use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use askama::Template;
use tracing::{error, info, warn};

use super::views::{schedule_view, DayView, EventsPartial, IndexTemplate};
use super::AppState;
use crate::components::google_calendar::{
    bucket_by_day, CacheState, EventQuery, EventSnapshot, RefreshOutcome,
};
use crate::error::Error;
use crate::utils::time::today_at;

/// Body returned to polling browsers when they should keep their content
pub const NO_CHANGE: &str = "false";

fn render<T: Template>(template: &T) -> Result<Html<String>, StatusCode> {
    template.render().map(Html).map_err(|e| {
        error!("{}", Error::from(e));
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Refresh through the cache; a dead cache actor is treated like a failed fetch
async fn refresh(state: &AppState, query: EventQuery) -> Option<RefreshOutcome> {
    match state.cache.refresh(query).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!("Event cache unavailable: {}", e);
            None
        }
    }
}

/// Group events into day views, or `None` if the data cannot be grouped
fn grouped_days(state: &AppState, events: &EventSnapshot) -> Option<Vec<DayView>> {
    match bucket_by_day(events, state.config.utc_offset) {
        Ok(schedule) => Some(schedule_view(&schedule, state.config.utc_offset)),
        Err(e) => {
            error!("Calendar data could not be grouped by day: {}", Error::from(e));
            None
        }
    }
}

/// Handler for the billboard page with upcoming events
pub async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let offset = state.config.utc_offset;
    let query = EventQuery::upcoming(today_at(offset), offset, state.config.upcoming_limit);

    let outcome = refresh(&state, query).await;
    let stale = !matches!(outcome, Some(RefreshOutcome::Updated { .. }));
    let days = outcome
        .and_then(RefreshOutcome::into_events)
        .and_then(|events| grouped_days(&state, &events));

    render(&IndexTemplate {
        title: &state.config.title,
        available: days.is_some(),
        stale: stale && days.is_some(),
        days: days.unwrap_or_default(),
        poll: true,
    })
}

/// Handler polled by the page: "false" when nothing changed, otherwise the new event list
pub async fn events_handler(State(state): State<AppState>) -> Response {
    let offset = state.config.utc_offset;
    let query = EventQuery::upcoming(today_at(offset), offset, state.config.upcoming_limit);

    let (previous, current) = match refresh(&state, query).await {
        Some(RefreshOutcome::Updated {
            previous: Some(previous),
            current,
        }) => (previous, current),
        Some(RefreshOutcome::Unavailable { reason, .. }) => {
            warn!("Poll could not reach the calendar: {}", reason);
            return NO_CHANGE.into_response();
        }
        _ => return NO_CHANGE.into_response(),
    };

    if state.config.change_detection.snapshots_match(&previous, &current) {
        return NO_CHANGE.into_response();
    }

    info!("Calendar changed, sending {} events", current.len());
    match grouped_days(&state, &current) {
        Some(days) => render(&EventsPartial {
            available: true,
            days,
        })
        .into_response(),
        // Keep whatever the browser already shows
        None => NO_CHANGE.into_response(),
    }
}

/// Handler for today's events in the order the calendar returned them.
///
/// Uses a one-off fetch so the upcoming events stay the baseline for polling.
pub async fn today_handler(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let offset = state.config.utc_offset;
    let today = today_at(offset);

    let fetched = match state.cache.fetch(EventQuery::today(today, offset)).await {
        Ok(result) => result.ok(),
        Err(e) => {
            error!("Event cache unavailable: {}", e);
            None
        }
    };

    let (events, stale) = match fetched {
        Some(events) => (Some(events.into_events()), false),
        // The cache holds the upcoming window, keep only what starts today
        None => match state.cache.latest().await {
            Ok(CacheState::Populated(cached)) => {
                let todays = cached
                    .events
                    .into_events()
                    .into_iter()
                    .filter(|event| event.start_date(offset).is_ok_and(|date| date == today))
                    .collect::<Vec<_>>();
                (Some(todays), true)
            }
            _ => (None, false),
        },
    };

    render(&IndexTemplate {
        title: &state.config.title,
        available: events.is_some(),
        stale,
        days: events
            .map(|events| vec![DayView::new(today, &events, offset)])
            .unwrap_or_default(),
        poll: false,
    })
}

// Handler for health check
pub async fn health_handler() -> &'static str {
    "OK"
}
