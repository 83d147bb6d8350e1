//! Application registry endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::{
    self,
    applications::{Application, ApplicationPatch, NewApplication},
};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateApplicationRequest {
    pub owner_badge: i64,
    pub app_name: String,
    #[serde(default)]
    pub dev_server_id: Option<i64>,
    #[serde(default)]
    pub prod_server_id: Option<i64>,
    #[serde(default)]
    pub app_description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub dev_domain: Option<String>,
    #[serde(default)]
    pub last_updated_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationRequest {
    #[serde(default)]
    pub dev_server_id: Option<i64>,
    #[serde(default)]
    pub prod_server_id: Option<i64>,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub app_description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub dev_domain: Option<String>,
    #[serde(default)]
    pub last_updated_by: Option<String>,
}

/// GET /api/applications
pub async fn list_applications(State(state): State<AppState>) -> ApiResult<Json<Vec<Application>>> {
    Ok(Json(db::applications::list_applications(&state.db).await?))
}

/// GET /api/applications/:id
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Application>> {
    let app = db::applications::find_application(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Application {} not found", id)))?;

    Ok(Json(app))
}

/// POST /api/applications
pub async fn create_application(
    State(state): State<AppState>,
    Json(payload): Json<CreateApplicationRequest>,
) -> ApiResult<(StatusCode, Json<Application>)> {
    if db::users::find_user(&state.db, payload.owner_badge).await?.is_none() {
        return Err(ApiError::NotFound(format!(
            "User with badge {} not found",
            payload.owner_badge
        )));
    }
    for server_id in [payload.dev_server_id, payload.prod_server_id].into_iter().flatten() {
        if db::servers::find_server(&state.db, server_id).await?.is_none() {
            return Err(ApiError::NotFound(format!("Server {} not found", server_id)));
        }
    }

    let app = NewApplication {
        owner_badge: payload.owner_badge,
        dev_server_id: payload.dev_server_id,
        prod_server_id: payload.prod_server_id,
        app_name: payload.app_name,
        app_description: payload.app_description,
        status: payload.status,
        dev_domain: payload.dev_domain,
        last_updated_by: payload.last_updated_by,
    };

    let created = db::applications::insert_application(&state.db, &app).await?;
    tracing::info!(app = %created.app_name, "Application registered");

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/applications/:id
pub async fn update_application(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateApplicationRequest>,
) -> ApiResult<Json<Application>> {
    for server_id in [payload.dev_server_id, payload.prod_server_id].into_iter().flatten() {
        if db::servers::find_server(&state.db, server_id).await?.is_none() {
            return Err(ApiError::NotFound(format!("Server {} not found", server_id)));
        }
    }

    let patch = ApplicationPatch {
        dev_server_id: payload.dev_server_id,
        prod_server_id: payload.prod_server_id,
        app_name: payload.app_name,
        app_description: payload.app_description,
        status: payload.status,
        dev_domain: payload.dev_domain,
        last_updated_by: payload.last_updated_by,
    };

    let updated = db::applications::update_application(&state.db, id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Application {} not found", id)))?;

    Ok(Json(updated))
}

/// Build application routes
pub fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/api/applications", get(list_applications).post(create_application))
        .route("/api/applications/:id", get(get_application).put(update_application))
}
