//! chronosculpt-server: HTTP API for daily habit tracking
//!
//! Users keep a list of habits and generate one record per day. Each record
//! is seeded with one entry per active habit, which is then checked off,
//! annotated, and sorted into one of four quadrants.
//!
//! Layers:
//! - [`config`]: database and server settings from the environment
//! - [`db`]: connection pool, schema bootstrap, repositories
//! - [`models`]: day boundaries and input validation errors
//! - [`http`]: axum router, extractors, handlers, error mapping

pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::{ConfigError, DatabaseConfig, PoolSettings};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
