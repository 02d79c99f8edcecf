use crate::error::FetchError;
use crate::utils::time::day_start_iso;
use async_trait::async_trait;
use chrono::{Duration, FixedOffset, NaiveDate};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration as StdDuration;
use tracing::debug;
use url::Url;

/// Google Calendar v3 endpoint that holds the calendars
pub const DEFAULT_CALENDAR_ENDPOINT: &str = "https://www.googleapis.com/calendar/v3/calendars";

/// Sort order requested from the events endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    StartTime,
}

impl OrderBy {
    fn as_param(self) -> &'static str {
        match self {
            OrderBy::StartTime => "startTime",
        }
    }
}

/// Query parameters for one events request, apart from the API key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Expand recurring events into single instances
    pub single_events: bool,
    pub time_min: Option<String>,
    pub time_max: Option<String>,
    pub max_results: Option<u32>,
    pub order_by: Option<OrderBy>,
}

impl EventQuery {
    /// Events from midnight `today` to midnight the day after
    pub fn today(today: NaiveDate, offset: FixedOffset) -> Self {
        let tomorrow = today + Duration::days(1);
        Self {
            single_events: true,
            time_min: Some(day_start_iso(today, offset)),
            time_max: Some(day_start_iso(tomorrow, offset)),
            max_results: None,
            order_by: None,
        }
    }

    /// The next `limit` events starting from midnight `today`, sorted by start time
    pub fn upcoming(today: NaiveDate, offset: FixedOffset, limit: u32) -> Self {
        Self {
            single_events: true,
            time_min: Some(day_start_iso(today, offset)),
            time_max: None,
            max_results: Some(limit),
            order_by: Some(OrderBy::StartTime),
        }
    }

    /// Query pairs in the order they are appended to the URL
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("singleEvents", self.single_events.to_string())];

        if let Some(order_by) = self.order_by {
            pairs.push(("orderBy", order_by.as_param().to_string()));
        }
        if let Some(time_min) = &self.time_min {
            pairs.push(("timeMin", time_min.clone()));
        }
        if let Some(time_max) = &self.time_max {
            pairs.push(("timeMax", time_max.clone()));
        }
        if let Some(max_results) = self.max_results {
            pairs.push(("maxResults", max_results.to_string()));
        }

        pairs
    }
}

/// Anything that can answer an events query with the API's JSON payload
#[async_trait]
pub trait CalendarSource: Send + Sync + 'static {
    /// Perform a single attempt. Failures are reported, never retried.
    async fn fetch(&self, query: &EventQuery) -> Result<Value, FetchError>;
}

/// Calendar source backed by the Google Calendar REST API with an API key
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    endpoint: String,
    calendar_id: String,
    api_key: String,
    timeout: StdDuration,
}

impl GoogleCalendarClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(
        endpoint: &str,
        calendar_id: &str,
        api_key: &str,
        timeout: StdDuration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Unreachable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            calendar_id: calendar_id.to_string(),
            api_key: api_key.to_string(),
            timeout,
        })
    }

    /// URL of the calendar's events collection, without query parameters
    pub fn events_url(&self) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", self.endpoint, e)))?;

        // Calendar ids may contain '#', so push them as an encoded segment
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.endpoint.clone()))?
            .pop_if_empty()
            .push(&self.calendar_id)
            .push("events");

        Ok(url)
    }

    fn request_url(&self, query: &EventQuery) -> Result<Url, FetchError> {
        let mut url = self.events_url()?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (key, value) in query.to_pairs() {
                pairs.append_pair(key, &value);
            }
        }
        Ok(url)
    }
}

fn classify(err: reqwest::Error, timeout: StdDuration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout)
    } else if err.is_decode() {
        FetchError::Decode(err.to_string())
    } else {
        // Strip the URL so the API key never ends up in logs
        FetchError::Unreachable(err.without_url().to_string())
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn fetch(&self, query: &EventQuery) -> Result<Value, FetchError> {
        let url = self.request_url(query)?;
        debug!("Fetching calendar events with {:?}", query.to_pairs());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(FetchError::Status { status, body });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| classify(e, self.timeout))
    }
}
