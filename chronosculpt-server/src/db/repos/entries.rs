//! Entry repository
//!
//! Entries are always read joined with their habit so the current habit
//! name is shown, even for deactivated or renamed habits.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};

use super::{DbError, Habit};

/// Entry row joined with its habit's name
#[derive(Debug, Clone, FromRow)]
pub struct EntryWithHabit {
    pub id: i32,
    pub record_id: i32,
    pub habit_id: i32,
    pub habit_name: String,
    pub comments: String,
    pub done: bool,
    pub quadrant: i32,
    pub done_at: Option<DateTime<Utc>>,
    pub split: Option<i32>,
}

/// Full replacement of an entry's editable fields
#[derive(Debug, Clone)]
pub struct EntryUpdate {
    pub comments: String,
    pub done: bool,
    pub quadrant: i32,
    pub done_at: Option<DateTime<Utc>>,
    pub split: Option<i32>,
}

/// Entry repository
pub struct EntryRepo<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> EntryRepo<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Entries of one record, in creation order.
    pub async fn for_record(&mut self, record_id: i32) -> Result<Vec<EntryWithHabit>, DbError> {
        let entries = sqlx::query_as::<_, EntryWithHabit>(
            r#"
            SELECT e.id, e.record_id, e.habit_id, h.name AS habit_name,
                   e.comments, e.done, e.quadrant, e.done_at, e.split
            FROM entries e
            JOIN habits h ON h.id = e.habit_id
            WHERE e.record_id = $1
            ORDER BY e.id
            "#,
        )
        .bind(record_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(entries)
    }

    /// Entries of several records in a single query, ordered by record then id.
    pub async fn for_records(&mut self, record_ids: &[i32]) -> Result<Vec<EntryWithHabit>, DbError> {
        if record_ids.is_empty() {
            return Ok(Vec::new());
        }

        let entries = sqlx::query_as::<_, EntryWithHabit>(
            r#"
            SELECT e.id, e.record_id, e.habit_id, h.name AS habit_name,
                   e.comments, e.done, e.quadrant, e.done_at, e.split
            FROM entries e
            JOIN habits h ON h.id = e.habit_id
            WHERE e.record_id = ANY($1)
            ORDER BY e.record_id, e.id
            "#,
        )
        .bind(record_ids)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(entries)
    }

    /// Seed one entry per habit, copying its comments and preferred quadrant.
    ///
    /// Single statement; callers run it inside the record's transaction.
    pub async fn insert_seeded(&mut self, record_id: i32, habits: &[Habit]) -> Result<u64, DbError> {
        let habit_ids: Vec<i32> = habits.iter().map(|h| h.id).collect();
        let comments: Vec<&str> = habits.iter().map(|h| h.comments.as_str()).collect();
        let quadrants: Vec<i32> = habits.iter().map(|h| h.preferred_quadrant).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO entries (record_id, habit_id, comments, quadrant)
            SELECT $1, seed.habit_id, seed.comments, seed.quadrant
            FROM UNNEST($2::int4[], $3::text[], $4::int4[])
                WITH ORDINALITY AS seed(habit_id, comments, quadrant, position)
            ORDER BY seed.position
            "#,
        )
        .bind(record_id)
        .bind(&habit_ids)
        .bind(&comments)
        .bind(&quadrants)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Overwrite an entry and return it with its habit name.
    pub async fn update(&mut self, id: i32, update: EntryUpdate) -> Result<EntryWithHabit, DbError> {
        sqlx::query_as::<_, EntryWithHabit>(
            r#"
            WITH updated AS (
                UPDATE entries
                SET comments = $2, done = $3, quadrant = $4, done_at = $5, split = $6
                WHERE id = $1
                RETURNING id, record_id, habit_id, comments, done, quadrant, done_at, split
            )
            SELECT u.id, u.record_id, u.habit_id, h.name AS habit_name,
                   u.comments, u.done, u.quadrant, u.done_at, u.split
            FROM updated u
            JOIN habits h ON h.id = u.habit_id
            "#,
        )
        .bind(id)
        .bind(&update.comments)
        .bind(update.done)
        .bind(update.quadrant)
        .bind(update.done_at)
        .bind(update.split)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DbError::not_found("entry", id))
    }
}
