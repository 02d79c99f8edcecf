#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use startup_billboard::components::google_calendar::{CalendarSource, EventQuery};
use startup_billboard::error::FetchError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Calendar source that answers with a scripted list of responses
#[derive(Clone, Default)]
pub struct ScriptedSource {
    responses: Arc<Mutex<VecDeque<Result<Value, FetchError>>>>,
    queries: Arc<Mutex<Vec<EventQuery>>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<Value, FetchError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            queries: Arc::default(),
        }
    }

    /// Queue another response
    pub fn push(&self, response: Result<Value, FetchError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<EventQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarSource for ScriptedSource {
    async fn fetch(&self, query: &EventQuery) -> Result<Value, FetchError> {
        self.queries.lock().unwrap().push(query.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Unreachable("no scripted response".to_string())))
    }
}

/// Calendar source that takes longer than any sensible timeout
pub struct SlowSource {
    pub delay: Duration,
}

#[async_trait]
impl CalendarSource for SlowSource {
    async fn fetch(&self, _query: &EventQuery) -> Result<Value, FetchError> {
        tokio::time::sleep(self.delay).await;
        Ok(payload(&[]))
    }
}

/// An events payload shaped like the Google Calendar API response
pub fn payload(items: &[Value]) -> Value {
    json!({
        "kind": "calendar#events",
        "summary": "Startup Edmonton",
        "timeZone": "America/Edmonton",
        "items": items,
    })
}

/// A timed event item
pub fn item(id: &str, start: &str, summary: &str) -> Value {
    json!({
        "id": id,
        "status": "confirmed",
        "summary": summary,
        "start": { "dateTime": start },
        "end": { "dateTime": start },
    })
}

pub fn unreachable() -> FetchError {
    FetchError::Unreachable("error trying to connect: Connection refused".to_string())
}
