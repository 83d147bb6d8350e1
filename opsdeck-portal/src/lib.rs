//! opsdeck-portal - Team portal backend
//!
//! CRUD endpoints for the team's users, servers, projects, and applications,
//! weekly accomplishment timesheets reconciled by natural key, and an
//! AI-backed accomplishment roll-up endpoint.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::services::llm::LlmClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Generation backend client for accomplishment roll-ups
    pub llm: Arc<LlmClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, llm: Arc<LlmClient>) -> Self {
        Self {
            db,
            llm,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::user_routes())
        .merge(api::server_routes())
        .merge(api::project_routes())
        .merge(api::application_routes())
        .merge(api::accomplishment_routes())
        .merge(api::summarize_routes())
        .with_state(state)
}
