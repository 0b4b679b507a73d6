//! Entry endpoints

use std::sync::Arc;

use axum::{routing::put, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::repos::{EntryRepo, EntryUpdate, EntryWithHabit};
use crate::http::error::ApiError;
use crate::http::extractors::{DbConn, JsonBody, ValidId};
use crate::http::server::AppState;

/// Update entry request (full replace; `doneAt` and `split` may be null)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntryRequest {
    #[serde(default)]
    pub comments: String,
    pub done: bool,
    pub quadrant: i32,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub done_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub split: Option<i32>,
}

/// Entry response, including the live habit name
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryResponse {
    pub id: i32,
    pub record_id: i32,
    pub habit_id: i32,
    pub habit_name: String,
    pub comments: String,
    pub done: bool,
    pub quadrant: i32,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub done_at: Option<DateTime<Utc>>,
    pub split: Option<i32>,
}

impl From<EntryWithHabit> for EntryResponse {
    fn from(e: EntryWithHabit) -> Self {
        Self {
            id: e.id,
            record_id: e.record_id,
            habit_id: e.habit_id,
            habit_name: e.habit_name,
            comments: e.comments,
            done: e.done,
            quadrant: e.quadrant,
            done_at: e.done_at,
            split: e.split,
        }
    }
}

/// PUT /entries/{entryId}/ - replace an entry's fields
async fn update_entry(
    ValidId(id): ValidId,
    DbConn(mut conn): DbConn,
    JsonBody(req): JsonBody<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = EntryRepo::new(&mut conn)
        .update(
            id,
            EntryUpdate {
                comments: req.comments,
                done: req.done,
                quadrant: req.quadrant,
                done_at: req.done_at,
                split: req.split,
            },
        )
        .await?;

    Ok(Json(EntryResponse::from(entry)))
}

/// Entry routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/entries/{id}/", put(update_entry))
}
