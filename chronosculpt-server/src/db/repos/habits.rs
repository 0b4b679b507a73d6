//! Habit repository
//!
//! Habits are never deleted: deactivation keeps historical entries joinable.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};

use super::DbError;

/// Habit row from database
#[derive(Debug, Clone, FromRow)]
pub struct Habit {
    pub id: i32,
    pub user_id: String,
    pub name: String,
    pub comments: String,
    pub preferred_quadrant: i32,
    pub since: DateTime<Utc>,
    pub active: bool,
}

/// Fields supplied when creating a habit
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub name: String,
    pub comments: String,
    pub preferred_quadrant: i32,
}

/// Full replacement of a habit's editable fields
#[derive(Debug, Clone)]
pub struct HabitUpdate {
    pub name: String,
    pub comments: String,
    pub preferred_quadrant: i32,
    pub active: bool,
}

/// Habit repository
pub struct HabitRepo<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> HabitRepo<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Active habits for a user, oldest first.
    pub async fn list_active(&mut self, user_id: &str) -> Result<Vec<Habit>, DbError> {
        let habits = sqlx::query_as::<_, Habit>(
            r#"
            SELECT id, user_id, name, comments, preferred_quadrant, since, active
            FROM habits
            WHERE user_id = $1 AND active
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(habits)
    }

    /// Insert an active habit; id and `since` come from the database.
    pub async fn create(&mut self, user_id: &str, habit: NewHabit) -> Result<Habit, DbError> {
        let created = sqlx::query_as::<_, Habit>(
            r#"
            INSERT INTO habits (user_id, name, comments, preferred_quadrant)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, comments, preferred_quadrant, since, active
            "#,
        )
        .bind(user_id)
        .bind(&habit.name)
        .bind(&habit.comments)
        .bind(habit.preferred_quadrant)
        .fetch_one(&mut *self.conn)
        .await?;

        tracing::debug!(habit_id = created.id, user_id, "habit created");
        Ok(created)
    }

    /// Overwrite name, comments, quadrant, and active flag.
    pub async fn update(&mut self, id: i32, update: HabitUpdate) -> Result<Habit, DbError> {
        sqlx::query_as::<_, Habit>(
            r#"
            UPDATE habits
            SET name = $2, comments = $3, preferred_quadrant = $4, active = $5
            WHERE id = $1
            RETURNING id, user_id, name, comments, preferred_quadrant, since, active
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.comments)
        .bind(update.preferred_quadrant)
        .bind(update.active)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| DbError::not_found("habit", id))
    }

    /// Soft-delete: mark an active habit inactive and return its id.
    ///
    /// An already inactive habit counts as missing, so deleting twice
    /// reports not found the second time.
    pub async fn deactivate(&mut self, id: i32) -> Result<i32, DbError> {
        let row: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE habits
            SET active = FALSE
            WHERE id = $1 AND active
            RETURNING id
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        row.map(|(deleted,)| deleted)
            .ok_or_else(|| DbError::not_found("habit", id))
    }
}
