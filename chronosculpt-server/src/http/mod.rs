//! HTTP server layer
//!
//! Axum server with:
//! - Per-request pooled connection (`DbConn` extractor)
//! - CORS (localhost only by default)
//! - Request tracing
//! - Graceful shutdown that closes the pool
//! - JSON error responses

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
