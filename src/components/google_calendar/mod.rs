mod actor;
pub mod client;
pub mod diff;
pub mod filters;
mod handle;
pub mod models;
pub mod schedule;

pub use actor::{CacheState, RefreshOutcome};
pub use client::{CalendarSource, EventQuery, GoogleCalendarClient, DEFAULT_CALENDAR_ENDPOINT};
pub use diff::{snapshots_match, snapshots_match_by_id, ChangeDetection};
pub use handle::EventCacheHandle;
pub use models::{CachedFetch, CalendarEvent, EventSnapshot, EventTime};
pub use schedule::{bucket_by_day, BucketedSchedule, DayBucket};
