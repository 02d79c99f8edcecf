use super::client::{CalendarSource, EventQuery};
use super::models::{CachedFetch, EventSnapshot};
use crate::error::{calendar_error, BillboardResult, Error, FetchError};
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// What a refresh produced
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// The fetch succeeded and replaced the cache
    Updated {
        /// Snapshot cached before this fetch, `None` on the first success
        previous: Option<EventSnapshot>,
        current: EventSnapshot,
    },
    /// The fetch failed; the cache is untouched
    Unavailable {
        reason: FetchError,
        /// Last good snapshot, if any fetch ever succeeded
        stale: Option<EventSnapshot>,
    },
}

impl RefreshOutcome {
    /// The freshest events available, fetched now or left from before
    pub fn events(&self) -> Option<&EventSnapshot> {
        match self {
            RefreshOutcome::Updated { current, .. } => Some(current),
            RefreshOutcome::Unavailable { stale, .. } => stale.as_ref(),
        }
    }

    pub fn into_events(self) -> Option<EventSnapshot> {
        match self {
            RefreshOutcome::Updated { current, .. } => Some(current),
            RefreshOutcome::Unavailable { stale, .. } => stale,
        }
    }
}

/// Contents of the cache at one moment
#[derive(Debug, Clone)]
pub enum CacheState {
    /// No fetch has succeeded yet
    Empty,
    Populated(CachedFetch),
}

impl CacheState {
    /// The cached events, or `Error::EmptyCache` if nothing was ever fetched
    pub fn snapshot(&self) -> BillboardResult<&EventSnapshot> {
        match self {
            CacheState::Empty => Err(Error::EmptyCache),
            CacheState::Populated(cached) => Ok(&cached.events),
        }
    }
}

/// The event cache actor that owns the cached fetch and processes messages
pub struct EventCacheActor {
    source: Box<dyn CalendarSource>,
    timeout: Duration,
    cached: Option<CachedFetch>,
    command_rx: mpsc::Receiver<EventCacheCommand>,
}

/// Commands that can be sent to the event cache actor
pub enum EventCacheCommand {
    Refresh(EventQuery, mpsc::Sender<RefreshOutcome>),
    Fetch(EventQuery, mpsc::Sender<Result<EventSnapshot, FetchError>>),
    Latest(mpsc::Sender<CacheState>),
    Shutdown,
}

/// Handle for communicating with the event cache actor
#[derive(Clone)]
pub struct EventCacheActorHandle {
    command_tx: mpsc::Sender<EventCacheCommand>,
}

impl EventCacheActorHandle {
    /// Fetch with `query` and update the cache on success
    pub async fn refresh(&self, query: EventQuery) -> BillboardResult<RefreshOutcome> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(EventCacheCommand::Refresh(query, response_tx))
            .await
            .map_err(|e| calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| calendar_error("Response channel closed"))
    }

    /// Fetch with `query` without touching the cache
    pub async fn fetch(
        &self,
        query: EventQuery,
    ) -> BillboardResult<Result<EventSnapshot, FetchError>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(EventCacheCommand::Fetch(query, response_tx))
            .await
            .map_err(|e| calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| calendar_error("Response channel closed"))
    }

    /// Read the cache without fetching
    pub async fn latest(&self) -> BillboardResult<CacheState> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(EventCacheCommand::Latest(response_tx))
            .await
            .map_err(|e| calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| calendar_error("Response channel closed"))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BillboardResult<()> {
        let _ = self.command_tx.send(EventCacheCommand::Shutdown).await;
        Ok(())
    }
}

impl EventCacheActor {
    /// Create a new actor and return its handle
    pub fn new(source: Box<dyn CalendarSource>, timeout: Duration) -> (Self, EventCacheActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            source,
            timeout,
            cached: None,
            command_rx,
        };

        let handle = EventCacheActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop.
    ///
    /// Commands are handled one at a time, so concurrent refreshes never
    /// interleave their writes to the cache.
    pub async fn run(&mut self) {
        info!("Event cache actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                EventCacheCommand::Refresh(query, response_tx) => {
                    let outcome = self.refresh(query).await;
                    let _ = response_tx.send(outcome).await;
                }
                EventCacheCommand::Fetch(query, response_tx) => {
                    let result = fetch_events(self.source.as_ref(), self.timeout, &query)
                        .await
                        .map(|(_, events)| events);
                    if let Err(e) = &result {
                        warn!("Calendar fetch failed: {}", e);
                    }
                    let _ = response_tx.send(result).await;
                }
                EventCacheCommand::Latest(response_tx) => {
                    let state = match &self.cached {
                        Some(cached) => CacheState::Populated(cached.clone()),
                        None => CacheState::Empty,
                    };
                    let _ = response_tx.send(state).await;
                }
                EventCacheCommand::Shutdown => {
                    info!("Event cache actor shutting down");
                    break;
                }
            }
        }

        info!("Event cache actor shut down");
    }

    async fn refresh(&mut self, query: EventQuery) -> RefreshOutcome {
        match fetch_events(self.source.as_ref(), self.timeout, &query).await {
            Ok((raw, events)) => {
                info!("Fetched {} calendar events", events.len());
                // Raw payload and events are replaced in one step
                let previous = self
                    .cached
                    .replace(CachedFetch {
                        raw,
                        events: events.clone(),
                        fetched_at: Utc::now(),
                    })
                    .map(|cached| cached.events);

                RefreshOutcome::Updated {
                    previous,
                    current: events,
                }
            }
            Err(reason) => {
                match &self.cached {
                    Some(cached) => warn!(
                        "Calendar fetch failed, keeping events fetched at {}: {}",
                        cached.fetched_at, reason
                    ),
                    None => warn!("Calendar fetch failed, nothing cached yet: {}", reason),
                }
                RefreshOutcome::Unavailable {
                    reason,
                    stale: self.cached.as_ref().map(|cached| cached.events.clone()),
                }
            }
        }
    }
}

/// One attempt bounded by `timeout`, decoded into events
async fn fetch_events(
    source: &dyn CalendarSource,
    timeout: Duration,
    query: &EventQuery,
) -> Result<(Value, EventSnapshot), FetchError> {
    let raw = match tokio::time::timeout(timeout, source.fetch(query)).await {
        Ok(result) => result?,
        Err(_) => return Err(FetchError::Timeout(timeout)),
    };

    let events = EventSnapshot::from_payload(&raw)?;
    Ok((raw, events))
}
