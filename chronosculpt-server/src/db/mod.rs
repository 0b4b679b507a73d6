//! Database layer - connection pool, schema, and repositories
//!
//! # Design Principles
//!
//! - One pooled connection per request, returned to the pool on drop
//! - Repositories borrow a connection; they never touch the pool
//! - Record lists fetch entries for every record in one query (no N+1)
//! - Record creation is the only multi-statement write and runs in a transaction

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::create_pool;
pub use repos::*;
pub use sqlx::PgPool;
