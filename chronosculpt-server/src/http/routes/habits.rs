//! Habit endpoints

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{Habit, HabitRepo, HabitUpdate, NewHabit};
use crate::http::error::ApiError;
use crate::http::extractors::{DbConn, JsonBody, UserId, ValidId};
use crate::http::server::AppState;

/// Create habit request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHabitRequest {
    pub name: String,
    #[serde(default)]
    pub comments: String,
    pub preferred_quadrant: i32,
}

/// Update habit request (full replace)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHabitRequest {
    pub name: String,
    #[serde(default)]
    pub comments: String,
    pub preferred_quadrant: i32,
    pub active: bool,
}

/// Habit response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitResponse {
    pub id: i32,
    pub user_id: String,
    pub name: String,
    pub comments: String,
    pub preferred_quadrant: i32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub since: chrono::DateTime<chrono::Utc>,
    pub active: bool,
}

impl From<Habit> for HabitResponse {
    fn from(h: Habit) -> Self {
        Self {
            id: h.id,
            user_id: h.user_id,
            name: h.name,
            comments: h.comments,
            preferred_quadrant: h.preferred_quadrant,
            since: h.since,
            active: h.active,
        }
    }
}

/// Habit list response
#[derive(Debug, Serialize)]
pub struct HabitListResponse {
    pub habits: Vec<HabitResponse>,
}

/// Soft-delete response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub deleted_id: i32,
}

/// GET /habits/{userId}/ - active habits of a user
async fn list_habits(
    UserId(user_id): UserId,
    DbConn(mut conn): DbConn,
) -> Result<Json<HabitListResponse>, ApiError> {
    let habits = HabitRepo::new(&mut conn).list_active(&user_id).await?;

    Ok(Json(HabitListResponse {
        habits: habits.into_iter().map(HabitResponse::from).collect(),
    }))
}

/// POST /habits/{userId}/add/ - create a habit
async fn create_habit(
    UserId(user_id): UserId,
    DbConn(mut conn): DbConn,
    JsonBody(req): JsonBody<CreateHabitRequest>,
) -> Result<(StatusCode, Json<HabitResponse>), ApiError> {
    let habit = HabitRepo::new(&mut conn)
        .create(
            &user_id,
            NewHabit {
                name: req.name,
                comments: req.comments,
                preferred_quadrant: req.preferred_quadrant,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(HabitResponse::from(habit))))
}

/// PUT /habits/{habitId}/ - replace a habit's fields
async fn update_habit(
    ValidId(id): ValidId,
    DbConn(mut conn): DbConn,
    JsonBody(req): JsonBody<UpdateHabitRequest>,
) -> Result<Json<HabitResponse>, ApiError> {
    let habit = HabitRepo::new(&mut conn)
        .update(
            id,
            HabitUpdate {
                name: req.name,
                comments: req.comments,
                preferred_quadrant: req.preferred_quadrant,
                active: req.active,
            },
        )
        .await?;

    Ok(Json(HabitResponse::from(habit)))
}

/// DELETE /habits/{habitId}/ - deactivate a habit
async fn delete_habit(
    ValidId(id): ValidId,
    DbConn(mut conn): DbConn,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted_id = HabitRepo::new(&mut conn).deactivate(id).await?;
    tracing::info!(habit_id = deleted_id, "habit deactivated");
    Ok(Json(DeletedResponse { deleted_id }))
}

/// Habit routes
///
/// `/habits/{id}/` carries a user id for GET and a habit id for PUT/DELETE.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/habits/{id}/",
            get(list_habits).put(update_habit).delete(delete_habit),
        )
        .route("/habits/{id}/add/", post(create_habit))
}
