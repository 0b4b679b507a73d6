//! Schema bootstrap command

use anyhow::{Context, Result};
use clap::Parser;

use chronosculpt_server::db::schema;

use super::{connect, DatabaseArgs};

/// Arguments for the init-db command
#[derive(Parser, Debug)]
pub struct InitDbArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Create tables and indexes, then close the pool.
pub async fn run_init_db(args: InitDbArgs) -> Result<()> {
    let pool = connect(args.database).await?;

    let result = schema::bootstrap(&pool)
        .await
        .context("Failed to create database schema");
    pool.close().await;
    result?;

    println!("Database schema ready");
    Ok(())
}
