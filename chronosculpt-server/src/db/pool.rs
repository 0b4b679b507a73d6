//! Database connection pool management
//!
//! Uses sqlx PgPool with a warm minimum, a hard maximum, and a short
//! checkout timeout so a saturated pool surfaces as an error instead of
//! an unbounded queue.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

use crate::config::PoolSettings;

/// Create a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns an error if the first connection cannot be established.
///
/// # Example
///
/// ```ignore
/// let options = DatabaseConfig::from_env()?.connect_options()?;
/// let pool = create_pool(options, PoolSettings::default()).await?;
/// ```
pub async fn create_pool(
    options: PgConnectOptions,
    settings: PoolSettings,
) -> Result<PgPool, sqlx::Error> {
    tracing::debug!(
        min = settings.min_connections,
        max = settings.max_connections,
        acquire_timeout_ms = settings.acquire_timeout.as_millis() as u64,
        "creating connection pool"
    );

    PgPoolOptions::new()
        .min_connections(settings.min_connections)
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(options)
        .await
}
