//! Custom Axum extractors
//!
//! Every rejection is an [`ApiError`] so clients always get a JSON body.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;

use super::error::ApiError;
use super::server::AppState;
use crate::db::DbError;
use crate::models::day::from_epoch_millis;
use crate::models::ValidationError;

/// Pooled connection held for the duration of one request.
///
/// Checked out before the handler runs and returned to the pool when the
/// handler's future completes, fails, or is dropped.
pub struct DbConn(pub PoolConnection<Postgres>);

impl FromRequestParts<Arc<AppState>> for DbConn {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let conn = state.pool.acquire().await.map_err(DbError::from)?;
        Ok(Self(conn))
    }
}

/// Extract a numeric id from a single-segment path
pub struct ValidId(pub i32);

impl<S> FromRequestParts<S> for ValidId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        Ok(Self(parse_id("id", &raw)?))
    }
}

/// Extract the client-supplied user id from a single-segment path
pub struct UserId(pub String);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "user id" }))?;

        if raw.trim().is_empty() {
            return Err(ValidationError::Empty { field: "user id" }.into());
        }
        Ok(Self(raw))
    }
}

/// Extract `{userId}/{timestamp}` where the timestamp is epoch milliseconds
pub struct UserAtInstant {
    pub user_id: String,
    pub at: DateTime<Utc>,
}

impl<S> FromRequestParts<S> for UserAtInstant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path((user_id, raw_ts)): Path<(String, String)> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "timestamp" }))?;

        let millis = raw_ts
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::NotAnInteger {
                field: "timestamp",
                value: raw_ts.clone(),
            })?;

        Ok(Self {
            user_id,
            at: from_epoch_millis(millis)?,
        })
    }
}

/// JSON body whose rejection is reported as a validation error
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| {
                ApiError::Validation(ValidationError::MalformedBody {
                    reason: e.body_text(),
                })
            })?;
        Ok(Self(value))
    }
}

fn parse_id(field: &'static str, raw: &str) -> Result<i32, ValidationError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ValidationError::NotAnInteger {
            field,
            value: raw.to_owned(),
        })
}
