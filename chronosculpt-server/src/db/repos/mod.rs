//! Repository implementations for database access
//!
//! Each repository borrows one connection for its lifetime:
//! - Rows decode by column name into `FromRow` structs
//! - Missing update targets surface as `DbError::NotFound`
//! - Pool checkout failures surface as `DbError::Overloaded`

pub mod entries;
pub mod habits;
pub mod records;

use chrono::{DateTime, Utc};

pub use entries::{EntryRepo, EntryUpdate, EntryWithHabit};
pub use habits::{Habit, HabitRepo, HabitUpdate, NewHabit};
pub use records::{QuadrantNotes, Record, RecordRepo, RecordWithEntries};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("server overloaded: no database connection available")]
    Overloaded,

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("user '{user_id}' has no active habits to build a record from")]
    NoHabits { user_id: String },

    #[error("user '{user_id}' already has a record for the day starting {day}")]
    Duplicate { user_id: String, day: DateTime<Utc> },

    #[error("database error: {0}")]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Self::Overloaded,
            other => Self::Sqlx(other),
        }
    }
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: i32) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}
