use super::actor::{CacheState, EventCacheActorHandle, RefreshOutcome};
use super::client::{CalendarSource, EventQuery};
use super::models::EventSnapshot;
use crate::error::{BillboardResult, FetchError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Handle for interacting with the event cache actor
#[derive(Clone)]
pub struct EventCacheHandle {
    actor_handle: EventCacheActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl EventCacheHandle {
    /// Create a new EventCacheHandle and spawn the actor.
    ///
    /// Every fetch through this cache gives up after `timeout`.
    pub fn new<S: CalendarSource>(source: S, timeout: Duration) -> Self {
        use super::actor::EventCacheActor;

        // Create the actor and get its handle
        let (mut actor, handle) = EventCacheActor::new(Box::new(source), timeout);

        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Fetch events and update the cache when the fetch succeeds
    pub async fn refresh(&self, query: EventQuery) -> BillboardResult<RefreshOutcome> {
        self.actor_handle.refresh(query).await
    }

    /// Fetch events for a one-off view; the cache and the poll baseline stay as they are
    pub async fn fetch(
        &self,
        query: EventQuery,
    ) -> BillboardResult<Result<EventSnapshot, FetchError>> {
        self.actor_handle.fetch(query).await
    }

    /// Current cache contents without fetching
    pub async fn latest(&self) -> BillboardResult<CacheState> {
        self.actor_handle.latest().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> BillboardResult<()> {
        self.actor_handle.shutdown().await
    }
}
