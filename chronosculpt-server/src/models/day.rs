//! Tracking-day boundaries
//!
//! A day is a UTC calendar day shifted by a fixed offset, so a user who
//! starts the day at 04:00 UTC can set the offset to 240 minutes and keep
//! late-night edits on the previous day. Records store the start of their
//! day, which makes "same day" and "since" comparisons plain range checks.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use super::ValidationError;

/// Maps instants to the start of the tracking day that contains them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayBoundary {
    offset: Duration,
}

impl DayBoundary {
    /// Days start at UTC midnight plus `offset_minutes`.
    pub fn new(offset_minutes: i64) -> Self {
        Self {
            offset: Duration::minutes(offset_minutes),
        }
    }

    /// Start of the day containing `instant`.
    ///
    /// Fails when the shifted instant falls outside chrono's range.
    pub fn day_start(&self, instant: DateTime<Utc>) -> Result<DateTime<Utc>, ValidationError> {
        let shifted = instant
            .checked_sub_signed(self.offset)
            .ok_or_else(|| out_of_range(instant))?;
        let midnight = shifted.date_naive().and_time(NaiveTime::MIN).and_utc();
        midnight
            .checked_add_signed(self.offset)
            .ok_or_else(|| out_of_range(instant))
    }

    /// Half-open `[start, end)` range of the day containing `instant`.
    pub fn day_range(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), ValidationError> {
        let start = self.day_start(instant)?;
        let end = start
            .checked_add_signed(Duration::days(1))
            .ok_or_else(|| out_of_range(instant))?;
        Ok((start, end))
    }
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self::new(0)
    }
}

fn out_of_range(instant: DateTime<Utc>) -> ValidationError {
    ValidationError::TimestampOutOfRange {
        value: instant.timestamp_millis(),
    }
}

/// Convert epoch milliseconds from a request path into an instant.
pub fn from_epoch_millis(millis: i64) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or(ValidationError::TimestampOutOfRange { value: millis })
}
