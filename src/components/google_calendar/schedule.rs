use super::models::{CalendarEvent, EventSnapshot};
use crate::error::ScheduleError;
use chrono::{Duration, FixedOffset, NaiveDate};

/// Longest schedule in days; a start beyond it is treated as bad data
pub const MAX_SPAN_DAYS: i64 = 366;

/// Events starting on one calendar day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub events: Vec<CalendarEvent>,
}

impl DayBucket {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            events: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Consecutive days of events, with days that have nothing on them kept as
/// empty buckets so a calendar grid can be drawn without gaps
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BucketedSchedule {
    pub days: Vec<DayBucket>,
}

impl BucketedSchedule {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// First and last day covered, if any
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.days.first()?.date, self.days.last()?.date))
    }

    /// All events back in one list, in schedule order
    pub fn flatten(&self) -> EventSnapshot {
        self.days
            .iter()
            .flat_map(|day| day.events.iter().cloned())
            .collect::<Vec<_>>()
            .into()
    }
}

/// Group events into one bucket per day, starting at the first event's day.
///
/// The events must already be sorted by start; an event that starts before
/// the day currently being filled is reported instead of being moved.
/// An empty snapshot gives an empty schedule. An event more than
/// [`MAX_SPAN_DAYS`] after the first one is rejected so a mistyped year cannot
/// produce a bucket for every day in between.
pub fn bucket_by_day(
    snapshot: &EventSnapshot,
    offset: FixedOffset,
) -> Result<BucketedSchedule, ScheduleError> {
    let mut days = Vec::new();
    let mut current: Option<DayBucket> = None;
    let mut first: Option<NaiveDate> = None;

    for event in snapshot {
        let date = event.start_date(offset)?;
        let start = *first.get_or_insert(date);
        if (date - start).num_days() >= MAX_SPAN_DAYS {
            return Err(ScheduleError::SpanTooLong {
                event_id: event.id.clone(),
                first: start,
                found: date,
            });
        }

        let mut bucket = match current.take() {
            None => DayBucket::empty(date),
            Some(bucket) if bucket.date == date => bucket,
            Some(bucket) if bucket.date > date => {
                return Err(ScheduleError::OutOfOrder {
                    event_id: event.id.clone(),
                    cursor: bucket.date,
                    found: date,
                });
            }
            Some(bucket) => {
                // Fill the gap so every day between the two has a bucket
                let mut day = bucket.date + Duration::days(1);
                days.push(bucket);
                while day < date {
                    days.push(DayBucket::empty(day));
                    day += Duration::days(1);
                }
                DayBucket::empty(date)
            }
        };

        bucket.events.push(event.clone());
        current = Some(bucket);
    }

    days.extend(current);
    Ok(BucketedSchedule { days })
}
