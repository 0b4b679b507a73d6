//! HTTP server command
//!
//! Ensures the schema exists, then runs the API until Ctrl+C/SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use chronosculpt_server::config::day_start_offset_from_env;
use chronosculpt_server::db::schema;
use chronosculpt_server::models::DayBoundary;
use chronosculpt_server::{run_server, ServerConfig};

use super::{connect, DatabaseArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "CHRONOSCULPT_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let day = DayBoundary::new(day_start_offset_from_env()?);
    let pool = connect(args.database).await?;

    schema::bootstrap(&pool)
        .await
        .context("Failed to prepare database schema")?;

    tracing::info!("Starting chronosculpt server on {}", args.bind);

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    // Blocks until shutdown; the pool is closed on the way out.
    run_server(pool, day, config).await.context("Server error")?;

    Ok(())
}
