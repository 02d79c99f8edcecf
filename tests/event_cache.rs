mod common;

use chrono::{FixedOffset, NaiveDate};
use common::{item, payload, unreachable, ScriptedSource, SlowSource};
use serde_json::json;
use startup_billboard::components::google_calendar::{
    CacheState, EventCacheHandle, EventQuery, RefreshOutcome,
};
use startup_billboard::error::{Error, FetchError};
use std::time::Duration;

fn mountain() -> FixedOffset {
    FixedOffset::west_opt(6 * 3600).unwrap()
}

fn upcoming() -> EventQuery {
    EventQuery::upcoming(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), mountain(), 10)
}

fn meetup_payload() -> serde_json::Value {
    payload(&[
        item("meetup", "2024-03-01T09:00:00-06:00", "Meetup"),
        item("demo", "2024-03-03T14:00:00-06:00", "Demo Day"),
    ])
}

/// A cache that never fetched is empty, not "zero events"
#[tokio::test]
async fn test_cache_starts_empty() {
    let cache = EventCacheHandle::new(ScriptedSource::default(), Duration::from_secs(5));

    let state = cache.latest().await.unwrap();
    assert!(matches!(state, CacheState::Empty));
    assert!(matches!(state.snapshot(), Err(Error::EmptyCache)));
}

/// A successful fetch with no items is distinguishable from an empty cache
#[tokio::test]
async fn test_zero_events_is_not_empty_cache() {
    let source = ScriptedSource::new(vec![Ok(payload(&[]))]);
    let cache = EventCacheHandle::new(source, Duration::from_secs(5));

    let outcome = cache.refresh(upcoming()).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::Updated { previous: None, .. }));

    let state = cache.latest().await.unwrap();
    assert!(state.snapshot().unwrap().is_empty());
}

/// Successful fetches replace the raw payload and the events together
#[tokio::test]
async fn test_refresh_updates_both_slots() {
    let second = payload(&[item("pitch", "2024-03-05T18:00:00-06:00", "Pitch Night")]);
    let source = ScriptedSource::new(vec![Ok(meetup_payload()), Ok(second.clone())]);
    let cache = EventCacheHandle::new(source.clone(), Duration::from_secs(5));

    // First fetch: nothing cached before
    match cache.refresh(upcoming()).await.unwrap() {
        RefreshOutcome::Updated { previous, current } => {
            assert!(previous.is_none());
            assert_eq!(current.len(), 2);
        }
        other => panic!("Expected an update, got {:?}", other),
    }

    // Second fetch: the first snapshot comes back as previous
    match cache.refresh(upcoming()).await.unwrap() {
        RefreshOutcome::Updated { previous, current } => {
            assert_eq!(previous.unwrap().len(), 2);
            assert_eq!(current.len(), 1);
            assert_eq!(current.events()[0].id, "pitch");
        }
        other => panic!("Expected an update, got {:?}", other),
    }

    match cache.latest().await.unwrap() {
        CacheState::Populated(cached) => {
            assert_eq!(cached.raw, second);
            assert_eq!(cached.events.len(), 1);
            assert_eq!(cached.events.events()[0].id, "pitch");
        }
        CacheState::Empty => panic!("Cache should be populated"),
    }

    // The query is passed through untouched
    assert_eq!(source.queries(), vec![upcoming(), upcoming()]);
}

/// A failed fetch leaves the cache at its prior values
#[tokio::test]
async fn test_failed_refresh_keeps_stale_cache() {
    let source = ScriptedSource::new(vec![Ok(meetup_payload()), Err(unreachable())]);
    let cache = EventCacheHandle::new(source, Duration::from_secs(5));

    cache.refresh(upcoming()).await.unwrap();

    match cache.refresh(upcoming()).await.unwrap() {
        RefreshOutcome::Unavailable { reason, stale } => {
            assert_eq!(reason, unreachable());
            assert_eq!(stale.unwrap().len(), 2);
        }
        other => panic!("Expected unavailable, got {:?}", other),
    }

    match cache.latest().await.unwrap() {
        CacheState::Populated(cached) => {
            assert_eq!(cached.raw, meetup_payload());
            assert_eq!(cached.events.len(), 2);
        }
        CacheState::Empty => panic!("Cache should still hold the first fetch"),
    }
}

/// Failing before anything was cached reports no stale data and stays empty
#[tokio::test]
async fn test_failed_first_refresh() {
    let source = ScriptedSource::new(vec![Err(FetchError::Status {
        status: 403,
        body: "API key not valid".to_string(),
    })]);
    let cache = EventCacheHandle::new(source, Duration::from_secs(5));

    let outcome = cache.refresh(upcoming()).await.unwrap();
    assert!(matches!(
        outcome,
        RefreshOutcome::Unavailable { stale: None, .. }
    ));
    assert!(outcome.events().is_none());
    assert!(matches!(cache.latest().await.unwrap(), CacheState::Empty));
}

/// A payload without items counts as a failed fetch
#[tokio::test]
async fn test_payload_without_items_is_a_failure() {
    let error_body = json!({ "error": { "code": 404, "message": "Not Found" } });
    let source = ScriptedSource::new(vec![Ok(meetup_payload()), Ok(error_body)]);
    let cache = EventCacheHandle::new(source, Duration::from_secs(5));

    cache.refresh(upcoming()).await.unwrap();
    let outcome = cache.refresh(upcoming()).await.unwrap();

    match outcome {
        RefreshOutcome::Unavailable { reason, stale } => {
            assert_eq!(reason, FetchError::MissingItems);
            assert_eq!(stale.unwrap().len(), 2);
        }
        other => panic!("Expected unavailable, got {:?}", other),
    }
}

/// A one-off fetch returns events without replacing the cache
#[tokio::test]
async fn test_fetch_leaves_cache_alone() {
    let todays = payload(&[item("meetup", "2024-03-01T09:00:00-06:00", "Meetup")]);
    let source = ScriptedSource::new(vec![
        Ok(meetup_payload()),
        Ok(todays),
        Err(unreachable()),
    ]);
    let cache = EventCacheHandle::new(source, Duration::from_secs(5));
    let today = EventQuery::today(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), mountain());

    cache.refresh(upcoming()).await.unwrap();

    let fetched = cache.fetch(today.clone()).await.unwrap().unwrap();
    assert_eq!(fetched.len(), 1);

    let failed = cache.fetch(today).await.unwrap();
    assert_eq!(failed, Err(unreachable()));

    match cache.latest().await.unwrap() {
        CacheState::Populated(cached) => {
            assert_eq!(cached.raw, meetup_payload());
            assert_eq!(cached.events.len(), 2);
            assert!(cached.fetched_at <= chrono::Utc::now());
        }
        CacheState::Empty => panic!("Cache should hold the upcoming fetch"),
    }
}

/// A hung source is cut off by the timeout and treated as a failure
#[tokio::test]
async fn test_refresh_times_out() {
    let source = SlowSource {
        delay: Duration::from_secs(30),
    };
    let cache = EventCacheHandle::new(source, Duration::from_millis(50));

    let outcome = cache.refresh(upcoming()).await.unwrap();
    match outcome {
        RefreshOutcome::Unavailable { reason, stale } => {
            assert_eq!(reason, FetchError::Timeout(Duration::from_millis(50)));
            assert!(stale.is_none());
        }
        other => panic!("Expected a timeout, got {:?}", other),
    }
}

/// Concurrent refreshes are serialized, each sees the one before it
#[tokio::test]
async fn test_concurrent_refreshes_are_serialized() {
    // The n-th fetch answers with n events
    let responses = (1..=8)
        .map(|n| {
            let event = item(&format!("e{}", n), "2024-03-01T09:00:00-06:00", "Event");
            Ok(payload(&vec![event; n]))
        })
        .collect();
    let source = ScriptedSource::new(responses);
    let cache = EventCacheHandle::new(source, Duration::from_secs(5));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.refresh(upcoming()).await.unwrap() })
        })
        .collect();

    let mut lengths = Vec::new();
    for task in tasks {
        match task.await.unwrap() {
            RefreshOutcome::Updated { previous, current } => {
                lengths.push((previous.map(|p| p.len()), current.len()));
            }
            other => panic!("Expected an update, got {:?}", other),
        }
    }

    // Every previous snapshot is the current one of exactly one other refresh
    lengths.sort();
    assert_eq!(lengths[0], (None, 1));
    for window in lengths.windows(2) {
        assert_eq!(window[1].0, Some(window[0].1));
    }
}

/// After shutdown the handle reports an error instead of hanging
#[tokio::test]
async fn test_refresh_after_shutdown() {
    let cache = EventCacheHandle::new(ScriptedSource::default(), Duration::from_secs(5));
    cache.shutdown().await.unwrap();

    // Give the actor a moment to stop
    tokio::time::sleep(Duration::from_millis(50)).await;

    let result = cache.refresh(upcoming()).await;
    assert!(matches!(result, Err(Error::GoogleCalendar(_))));
}
