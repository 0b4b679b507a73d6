//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses `{"error", "message"}` with
//! appropriate status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::DbError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Path or body could not be parsed (400)
    Validation(ValidationError),

    /// Update/delete target missing (404)
    NotFound { resource: &'static str, id: String },

    /// Record requested but the user has no active habits (400)
    NoHabits { message: String },

    /// Record already exists for the day (409)
    Duplicate { message: String },

    /// No pooled connection available (503)
    Overloaded,

    /// Any other database failure (500, logged)
    Database(DbError),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::NoHabits { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Duplicate { .. } => StatusCode::CONFLICT,
            Self::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(e) => json!({
                "error": "validation_error",
                "message": e.to_string()
            }),
            Self::NotFound { resource, id } => json!({
                "error": "not_found",
                "message": format!("{} '{}' not found", resource, id)
            }),
            Self::NoHabits { message } => json!({
                "error": "no_habits",
                "message": message
            }),
            Self::Duplicate { message } => json!({
                "error": "duplicate",
                "message": message
            }),
            Self::Overloaded => {
                tracing::warn!("connection pool exhausted, rejecting request");
                json!({
                    "error": "overloaded",
                    "message": "Server overloaded"
                })
            }
            Self::Database(e) => {
                tracing::error!("Database error: {}", e);
                json!({
                    "error": "internal_error",
                    "message": e.to_string()
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Overloaded => Self::Overloaded,
            DbError::NoHabits { .. } => Self::NoHabits {
                message: e.to_string(),
            },
            DbError::Duplicate { .. } => Self::Duplicate {
                message: e.to_string(),
            },
            DbError::Sqlx(_) => Self::Database(e),
        }
    }
}
