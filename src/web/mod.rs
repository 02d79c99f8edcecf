//! HTTP front end: the billboard page, the polling endpoint and friends.

pub mod handlers;
pub mod views;

use crate::components::EventCacheHandle;
use crate::config::Config;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use handlers::{events_handler, health_handler, index_handler, today_handler};

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    /// Cache of the last calendar fetch
    pub cache: EventCacheHandle,
    /// Loaded configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(cache: EventCacheHandle, config: Config) -> Self {
        Self {
            cache,
            config: Arc::new(config),
        }
    }
}

/// Build the router with all billboard routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/events", get(events_handler))
        .route("/events/", get(events_handler))
        .route("/today", get(today_handler))
        .route("/health", get(health_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
