//! Command implementations for chronosculpt CLI

pub mod init_db;
pub mod serve;

pub use init_db::run_init_db;
pub use serve::run_serve;

use anyhow::{Context, Result};
use chronosculpt_server::db::{create_pool, PgPool};
use chronosculpt_server::{DatabaseConfig, PoolSettings};

/// Connection flags shared by every command that talks to PostgreSQL
#[derive(clap::Args, Debug)]
pub struct DatabaseArgs {
    /// Database URL (overrides DB_HOST/DB_PORT/DB_USER/DB_PASSWORD/DB_NAME)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Build the pool from flags and environment.
pub async fn connect(args: DatabaseArgs) -> Result<PgPool> {
    let db = DatabaseConfig::from_env()?.with_url(args.database_url);
    let options = db
        .connect_options()
        .context("Database not configured. Set DATABASE_URL or DB_NAME (plus DB_HOST, DB_USER, ...)")?;
    let settings = PoolSettings::from_env()?;

    create_pool(options, settings)
        .await
        .context("Failed to create database pool")
}
