//! chronosculpt CLI - habit tracking API server
//!
//! Subcommands:
//! - `serve`: ensure the schema, then run the HTTP API until Ctrl+C/SIGTERM
//! - `init-db`: create tables and indexes, then exit

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "chronosculpt",
    author,
    version,
    about = "REST backend for daily habit tracking",
    long_about = "Serve habits, daily records, and their entries from PostgreSQL. \
                  Configuration comes from flags, the environment, ./.env, or ~/.chronosculpt/.env."
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create database tables and indexes if missing
    InitDb(commands::init_db::InitDbArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_files = config::load_dotenv();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })?;
    env_files.log();

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::InitDb(args) => commands::run_init_db(args).await,
    };

    tracing_setup::shutdown_otel();
    result
}
