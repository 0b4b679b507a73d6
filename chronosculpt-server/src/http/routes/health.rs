//! Liveness endpoints

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::db::DbError;
use crate::http::error::ApiError;
use crate::http::extractors::DbConn;
use crate::http::server::AppState;

/// Plain message response
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// GET /
async fn hello() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello world!",
    })
}

/// GET /wakeup - round trip to the database on a pooled connection
async fn wakeup(DbConn(mut conn): DbConn) -> Result<Json<MessageResponse>, ApiError> {
    sqlx::query("SELECT 1")
        .execute(&mut *conn)
        .await
        .map_err(DbError::from)?;

    Ok(Json(MessageResponse {
        message: "Server is awake",
    }))
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(hello))
        .route("/wakeup", get(wakeup))
}
