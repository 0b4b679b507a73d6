//! Table bootstrap
//!
//! Idempotent `CREATE ... IF NOT EXISTS` statements run at startup and by
//! `chronosculpt init-db`. There is no versioned migration history.

use sqlx::PgPool;

/// Create the habits, records, and entries tables plus their indexes.
pub async fn bootstrap(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Ensuring database schema...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS habits (
            id SERIAL PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            comments TEXT NOT NULL DEFAULT '',
            preferred_quadrant INTEGER NOT NULL
                CHECK (preferred_quadrant BETWEEN 0 AND 4),
            since TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            active BOOLEAN NOT NULL DEFAULT TRUE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            id SERIAL PRIMARY KEY,
            user_id TEXT NOT NULL,
            date TIMESTAMPTZ NOT NULL,
            q1notes TEXT NOT NULL DEFAULT '',
            q2notes TEXT NOT NULL DEFAULT '',
            q3notes TEXT NOT NULL DEFAULT '',
            q4notes TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id SERIAL PRIMARY KEY,
            record_id INTEGER NOT NULL REFERENCES records(id) ON DELETE CASCADE,
            habit_id INTEGER NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
            comments TEXT NOT NULL DEFAULT '',
            done BOOLEAN NOT NULL DEFAULT FALSE,
            quadrant INTEGER NOT NULL,
            done_at TIMESTAMPTZ,
            split INTEGER
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("Database schema ready");
    Ok(())
}

async fn create_indexes(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_habits_user ON habits(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_records_user_date ON records(user_id, date)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entries_record ON entries(record_id)")
        .execute(pool)
        .await?;

    Ok(())
}
