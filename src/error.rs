use chrono::NaiveDate;
use miette::Diagnostic;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(billboard::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(billboard::config))]
    Config(String),

    #[error("Google Calendar error: {0}")]
    #[diagnostic(code(billboard::google_calendar))]
    GoogleCalendar(String),

    #[error(transparent)]
    #[diagnostic(code(billboard::fetch))]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    #[diagnostic(code(billboard::parse))]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(code(billboard::schedule))]
    Schedule(#[from] ScheduleError),

    #[error("No calendar fetch has succeeded yet")]
    #[diagnostic(code(billboard::empty_cache))]
    EmptyCache,

    #[error("Template error: {0}")]
    #[diagnostic(code(billboard::template))]
    Template(String),

    #[error(transparent)]
    #[diagnostic(code(billboard::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(billboard::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(billboard::other))]
    Other(String),
}

/// A failed attempt to fetch events from the calendar API.
///
/// These never reach request handlers as errors; the cache turns them into
/// an "unavailable" outcome and keeps serving what it had.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Calendar API unreachable: {0}")]
    Unreachable(String),

    #[error("Calendar API did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Calendar API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Calendar API response was not valid JSON: {0}")]
    Decode(String),

    #[error("Calendar API response has no items list")]
    MissingItems,

    #[error("Invalid calendar URL: {0}")]
    InvalidUrl(String),
}

/// A timestamp from the calendar source that does not match the expected format
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Timestamp '{value}' does not end with the expected offset {expected}")]
    OffsetMismatch { value: String, expected: String },

    #[error("Timestamp '{value}' is malformed: {reason}")]
    Malformed { value: String, reason: String },

    #[error("Invalid UTC offset '{0}', expected ±HH:MM")]
    InvalidOffset(String),

    #[error("Event '{0}' has neither a dateTime nor a date")]
    MissingStart(String),
}

/// Errors raised while grouping events into days
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Event '{event_id}' on {found} comes after an event on {cursor}; events must be sorted by start")]
    OutOfOrder {
        event_id: String,
        cursor: NaiveDate,
        found: NaiveDate,
    },

    #[error("Event '{event_id}' on {found} is too far after the first event on {first}")]
    SpanTooLong {
        event_id: String,
        first: NaiveDate,
        found: NaiveDate,
    },
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(feature = "web-interface")]
impl From<askama::Error> for Error {
    fn from(err: askama::Error) -> Self {
        Error::Template(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BillboardResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}
