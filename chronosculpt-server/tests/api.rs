//! End-to-end API tests against a real PostgreSQL database
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p chronosculpt-server -- --ignored

use std::str::FromStr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::postgres::PgConnectOptions;
use tower::ServiceExt;

use chronosculpt_server::db::{create_pool, schema};
use chronosculpt_server::models::DayBoundary;
use chronosculpt_server::{build_router, AppState, PoolSettings, ServerConfig};

async fn app() -> Router {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let options = PgConnectOptions::from_str(&url).expect("invalid DATABASE_URL");
    let settings = PoolSettings {
        min_connections: 0,
        ..PoolSettings::default()
    };
    let pool = create_pool(options, settings).await.expect("pool creation failed");
    schema::bootstrap(&pool).await.expect("schema bootstrap failed");

    let state = Arc::new(AppState::new(pool, DayBoundary::default()));
    build_router(state, &ServerConfig::default())
}

fn fresh_user() -> String {
    format!("test-{}", uuid::Uuid::new_v4())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn add_habit(app: &Router, user: &str, name: &str, comments: &str, quadrant: i32) -> Value {
    let (status, habit) = send(
        app,
        Method::POST,
        &format!("/habits/{}/add/", user),
        Some(json!({ "name": name, "comments": comments, "preferredQuadrant": quadrant })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", habit);
    habit
}

#[tokio::test]
#[ignore = "requires database"]
async fn wakeup_reaches_database() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/wakeup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
}

#[tokio::test]
#[ignore = "requires database"]
async fn created_habit_is_listed_active() {
    let app = app().await;
    let user = fresh_user();

    let habit = add_habit(&app, &user, "Read", "20 pages", 2).await;
    assert!(habit["id"].as_i64().unwrap() > 0);
    assert_eq!(habit["active"], true);

    let (status, body) = send(&app, Method::GET, &format!("/habits/{}/", user), None).await;
    assert_eq!(status, StatusCode::OK);
    let habits = body["habits"].as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["id"], habit["id"]);
    assert_eq!(habits[0]["active"], true);
}

#[tokio::test]
#[ignore = "requires database"]
async fn record_without_habits_is_rejected() {
    let app = app().await;
    let user = fresh_user();

    let (status, body) = send(&app, Method::POST, &format!("/records/{}/", user), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no_habits");

    let (_, body) = send(&app, Method::GET, &format!("/records/{}/", user), None).await;
    assert!(body["records"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn second_record_same_day_is_duplicate() {
    let app = app().await;
    let user = fresh_user();
    add_habit(&app, &user, "Run", "", 1).await;

    let (status, _) = send(&app, Method::POST, &format!("/records/{}/", user), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::POST, &format!("/records/{}/", user), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "duplicate");

    let (_, body) = send(&app, Method::GET, &format!("/records/{}/", user), None).await;
    assert_eq!(body["records"].as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires database"]
async fn record_seeds_one_entry_per_active_habit() {
    let app = app().await;
    let user = fresh_user();
    add_habit(&app, &user, "Run", "daily run", 1).await;
    add_habit(&app, &user, "Read", "20 pages", 2).await;
    let retired = add_habit(&app, &user, "Floss", "", 3).await;
    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/habits/{}/", retired["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, record) = send(&app, Method::POST, &format!("/records/{}/", user), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let entries = record["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["habitName"], "Run");
    assert_eq!(entries[0]["comments"], "daily run");
    assert_eq!(entries[0]["quadrant"], 1);
    assert_eq!(entries[1]["habitName"], "Read");
    assert_eq!(entries[1]["quadrant"], 2);
    assert_eq!(entries[1]["done"], false);
}

#[tokio::test]
#[ignore = "requires database"]
async fn soft_delete_keeps_existing_entries() {
    let app = app().await;
    let user = fresh_user();
    let habit = add_habit(&app, &user, "Run", "daily run", 1).await;
    send(&app, Method::POST, &format!("/records/{}/", user), None).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/habits/{}/", habit["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedId"], habit["id"]);

    let (_, body) = send(&app, Method::GET, &format!("/habits/{}/", user), None).await;
    assert!(body["habits"].as_array().unwrap().is_empty());

    let (_, body) = send(&app, Method::GET, &format!("/records/{}/", user), None).await;
    let entries = body["records"][0]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["habitName"], "Run");

    let (status, body) = send(&app, Method::DELETE, &format!("/habits/{}/", habit["id"]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
#[ignore = "requires database"]
async fn updating_notes_keeps_entries() {
    let app = app().await;
    let user = fresh_user();
    add_habit(&app, &user, "Run", "daily run", 1).await;
    let (_, record) = send(&app, Method::POST, &format!("/records/{}/", user), None).await;

    let notes = json!({ "q1notes": "a", "q2notes": "b", "q3notes": "c", "q4notes": "d" });
    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/records/{}/", record["id"]),
        Some(notes),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["q3notes"], "c");

    let (_, body) = send(&app, Method::GET, &format!("/records/{}/", user), None).await;
    let fetched = &body["records"][0];
    assert_eq!(fetched["q1notes"], "a");
    assert_eq!(fetched["q2notes"], "b");
    assert_eq!(fetched["q3notes"], "c");
    assert_eq!(fetched["q4notes"], "d");
    assert_eq!(fetched["entries"], record["entries"]);
}

#[tokio::test]
#[ignore = "requires database"]
async fn missing_targets_are_not_found() {
    let app = app().await;
    let missing = i32::MAX;

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/habits/{}/", missing),
        Some(json!({ "name": "x", "comments": "", "preferredQuadrant": 1, "active": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/records/{}/", missing),
        Some(json!({ "q1notes": "", "q2notes": "", "q3notes": "", "q4notes": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/entries/{}/", missing),
        Some(json!({ "comments": "", "done": true, "quadrant": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires database"]
async fn records_since_filters_by_day() {
    let app = app().await;
    let user = fresh_user();
    add_habit(&app, &user, "Run", "", 1).await;

    // 2024-01-10T12:00:00Z and 2024-01-12T08:00:00Z
    let early = 1_704_888_000_000_i64;
    let late = 1_705_046_400_000_i64;
    for ts in [early, late] {
        let (status, _) = send(&app, Method::POST, &format!("/records/{}/{}/", user, ts), None).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // 2024-01-12T23:00:00Z: same day as `late`
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/records/{}/{}/", user, 1_705_100_400_000_i64),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    // stored at the start of the day
    assert_eq!(records[0]["date"], 1_705_017_600_000_i64);
}

#[tokio::test]
#[ignore = "requires database"]
async fn bad_path_parameters_are_validation_errors() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/entries/abc/",
        Some(json!({ "done": true, "quadrant": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = send(&app, Method::GET, "/records/u1/yesterday/", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires database"]
async fn timestamps_at_the_edge_of_time_are_rejected() {
    let app = app().await;
    let user = fresh_user();
    add_habit(&app, &user, "Run", "", 1).await;

    // Last representable millisecond: its day would end past the range.
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/records/{}/8210266876799999/", user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, body) = send(&app, Method::GET, &format!("/records/{}/", user), None).await;
    assert!(body["records"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires database"]
async fn end_to_end_habit_to_done_entry() {
    let app = app().await;
    let user = fresh_user();

    add_habit(&app, &user, "Run", "daily run", 1).await;

    let (_, body) = send(&app, Method::GET, &format!("/habits/{}/", user), None).await;
    assert_eq!(body["habits"][0]["name"], "Run");

    let (status, record) = send(&app, Method::POST, &format!("/records/{}/", user), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let entries = record["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["quadrant"], 1);
    assert_eq!(entries[0]["comments"], "daily run");

    let (status, entry) = send(
        &app,
        Method::PUT,
        &format!("/entries/{}/", entries[0]["id"]),
        Some(json!({
            "comments": "daily run",
            "done": true,
            "quadrant": 1,
            "doneAt": 1_700_000_000_000_i64,
            "split": 30
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["done"], true);
    assert_eq!(entry["habitName"], "Run");

    let (_, body) = send(&app, Method::GET, &format!("/records/{}/", user), None).await;
    let entry = &body["records"][0]["entries"][0];
    assert_eq!(entry["done"], true);
    assert_eq!(entry["split"], 30);
    assert_eq!(entry["doneAt"], 1_700_000_000_000_i64);
}
