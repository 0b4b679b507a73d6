//! Record endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entries::EntryResponse;
use crate::db::repos::{QuadrantNotes, RecordRepo, RecordWithEntries};
use crate::http::error::ApiError;
use crate::http::extractors::{DbConn, JsonBody, UserAtInstant, UserId, ValidId};
use crate::http::server::AppState;

/// Update record notes request (all four overwritten)
#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    #[serde(default)]
    pub q1notes: String,
    #[serde(default)]
    pub q2notes: String,
    #[serde(default)]
    pub q3notes: String,
    #[serde(default)]
    pub q4notes: String,
}

/// Record response with nested entries
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub id: i32,
    pub user_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub q1notes: String,
    pub q2notes: String,
    pub q3notes: String,
    pub q4notes: String,
    pub entries: Vec<EntryResponse>,
}

impl From<RecordWithEntries> for RecordResponse {
    fn from(r: RecordWithEntries) -> Self {
        let RecordWithEntries { record, entries } = r;
        Self {
            id: record.id,
            user_id: record.user_id,
            date: record.date,
            q1notes: record.q1notes,
            q2notes: record.q2notes,
            q3notes: record.q3notes,
            q4notes: record.q4notes,
            entries: entries.into_iter().map(EntryResponse::from).collect(),
        }
    }
}

/// Record list response
#[derive(Debug, Serialize)]
pub struct RecordListResponse {
    pub records: Vec<RecordResponse>,
}

impl From<Vec<RecordWithEntries>> for RecordListResponse {
    fn from(records: Vec<RecordWithEntries>) -> Self {
        Self {
            records: records.into_iter().map(RecordResponse::from).collect(),
        }
    }
}

/// GET /records/{userId}/ - every record of a user
async fn list_records(
    UserId(user_id): UserId,
    DbConn(mut conn): DbConn,
) -> Result<Json<RecordListResponse>, ApiError> {
    let records = RecordRepo::new(&mut conn)
        .list_for_user(&user_id, None)
        .await?;
    Ok(Json(RecordListResponse::from(records)))
}

/// GET /records/{userId}/{timestamp}/ - records from the day of `timestamp` on
async fn list_records_since(
    State(state): State<Arc<AppState>>,
    path: UserAtInstant,
    DbConn(mut conn): DbConn,
) -> Result<Json<RecordListResponse>, ApiError> {
    let since = state.day.day_start(path.at)?;
    let records = RecordRepo::new(&mut conn)
        .list_for_user(&path.user_id, Some(since))
        .await?;
    Ok(Json(RecordListResponse::from(records)))
}

/// POST /records/{userId}/ - create today's record
async fn create_record_today(
    State(state): State<Arc<AppState>>,
    UserId(user_id): UserId,
    conn: DbConn,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    create_record(&state, &user_id, Utc::now(), conn).await
}

/// POST /records/{userId}/{timestamp}/ - create the record for the day of `timestamp`
async fn create_record_at(
    State(state): State<Arc<AppState>>,
    path: UserAtInstant,
    conn: DbConn,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    create_record(&state, &path.user_id, path.at, conn).await
}

async fn create_record(
    state: &AppState,
    user_id: &str,
    at: DateTime<Utc>,
    DbConn(mut conn): DbConn,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    let (start, end) = state.day.day_range(at)?;
    let record = RecordRepo::new(&mut conn)
        .create_for_day(user_id, start, end)
        .await?;

    Ok((StatusCode::CREATED, Json(RecordResponse::from(record))))
}

/// PUT /records/{recordId}/ - overwrite the quadrant notes
async fn update_record(
    ValidId(id): ValidId,
    DbConn(mut conn): DbConn,
    JsonBody(req): JsonBody<UpdateRecordRequest>,
) -> Result<Json<RecordResponse>, ApiError> {
    let record = RecordRepo::new(&mut conn)
        .update_notes(
            id,
            QuadrantNotes {
                q1notes: req.q1notes,
                q2notes: req.q2notes,
                q3notes: req.q3notes,
                q4notes: req.q4notes,
            },
        )
        .await?;

    Ok(Json(RecordResponse::from(record)))
}

/// Record routes
///
/// `/records/{id}/` carries a user id for GET/POST and a record id for PUT.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/records/{id}/",
            get(list_records)
                .post(create_record_today)
                .put(update_record),
        )
        .route(
            "/records/{id}/{timestamp}/",
            get(list_records_since).post(create_record_at),
        )
}
