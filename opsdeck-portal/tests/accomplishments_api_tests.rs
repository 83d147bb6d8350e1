//! Integration tests for the weekly accomplishment endpoints
//!
//! Drives the full router over in-memory SQLite: submit is an upsert keyed
//! on (user_badge, week_start, week_end), owners are a hard precondition,
//! and weeks never bleed into each other.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower::ServiceExt;

use opsdeck_portal::config::SummaryConfig;
use opsdeck_portal::services::llm::LlmClient;
use opsdeck_portal::{build_router, AppState};

async fn setup() -> (SqlitePool, Router) {
    let pool = SqlitePoolOptions::new().connect(":memory:").await.unwrap();
    opsdeck_portal::db::init_tables(&pool).await.unwrap();

    let llm = Arc::new(LlmClient::new(&SummaryConfig::default()).unwrap());
    let state = AppState::new(pool.clone(), llm);

    (pool, build_router(state))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_user(app: &Router, badge: i64) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/users",
            json!({ "badge": badge, "first_name": "Trung", "last_name": "T." }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn row_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM weekly_accomplishments")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn double_submit_updates_the_same_row() {
    let (pool, app) = setup().await;
    create_user(&app, 96880).await;

    let submit = |body: &str| {
        post_json(
            "/api/accomplishments",
            json!({
                "user_badge": 96880,
                "week_start": "2025-08-18",
                "week_end": "2025-08-24",
                "body": body,
            }),
        )
    };

    let response = app.clone().oneshot(submit("Did X")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first = body_json(response).await;
    assert_eq!(first["body"], "Did X");
    assert_eq!(first["status"], "Submitted");
    assert!(first["submitted_on"].is_string());

    let response = app.clone().oneshot(submit("Did X and Y")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["body"], "Did X and Y");
    assert_eq!(row_count(&pool).await, 1);
}

#[tokio::test]
async fn unknown_owner_is_404_and_writes_nothing() {
    let (pool, app) = setup().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/accomplishments",
            json!({
                "user_badge": 11111,
                "week_start": "2025-08-18",
                "week_end": "2025-08-24",
                "body": "Did X",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = body_json(response).await;
    assert_eq!(error["error"]["code"], "NOT_FOUND");
    assert_eq!(row_count(&pool).await, 0);
}

#[tokio::test]
async fn weeks_stay_independent() {
    let (_pool, app) = setup().await;
    create_user(&app, 96880).await;

    for (start, end, body) in [
        ("2025-08-18", "2025-08-24", "week one"),
        ("2025-08-25", "2025-08-31", "week two"),
        ("2025-08-18", "2025-08-24", "week one, revised"),
    ] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/accomplishments",
                json!({
                    "user_badge": 96880,
                    "week_start": start,
                    "week_end": end,
                    "body": body,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(get("/api/accomplishments/user/96880"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    let listed = listed.as_array().unwrap();

    assert_eq!(listed.len(), 2);
    // Newest week first; the revision landed on week one only
    assert_eq!(listed[0]["body"], "week two");
    assert_eq!(listed[1]["body"], "week one, revised");
}

#[tokio::test]
async fn explicit_fields_override_defaults() {
    let (_pool, app) = setup().await;
    create_user(&app, 96880).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/accomplishments",
            json!({
                "user_badge": 96880,
                "week_start": "2025-08-18",
                "week_end": "2025-08-24",
                "body": "Did X",
                "submitted_on": "2025-08-20",
                "status": "Draft",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let saved = body_json(response).await;
    assert_eq!(saved["submitted_on"], "2025-08-20");
    assert_eq!(saved["status"], "Draft");
}

#[tokio::test]
async fn malformed_dates_are_rejected() {
    let (_pool, app) = setup().await;
    create_user(&app, 96880).await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/accomplishments",
            json!({
                "user_badge": 96880,
                "week_start": "not-a-date",
                "week_end": "2025-08-24",
                "body": "Did X",
            }),
        ))
        .await
        .unwrap();

    // Serde rejects the payload before any handler logic runs
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
