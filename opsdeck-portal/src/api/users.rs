//! User directory endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::{
    self,
    users::{User, UserPatch},
};
use crate::{ApiError, ApiResult, AppState};

/// Request payload for creating a user
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub badge: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub read_only: Option<i64>,
}

/// Request payload for updating a user; absent fields are left unchanged
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub read_only: Option<i64>,
}

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(db::users::list_users(&state.db).await?))
}

/// GET /api/users/:badge
pub async fn get_user(
    State(state): State<AppState>,
    Path(badge): Path<i64>,
) -> ApiResult<Json<User>> {
    let user = db::users::find_user(&state.db, badge)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with badge {} not found", badge)))?;

    Ok(Json(user))
}

/// POST /api/users
///
/// A duplicate badge responds 409; badges are assigned by HR, not minted
/// here.
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "first_name and last_name are required".to_string(),
        ));
    }

    let user = User {
        badge: payload.badge,
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        position: payload.position,
        read_only: payload.read_only.unwrap_or(0),
    };

    let created = db::users::insert_user(&state.db, &user).await?;
    tracing::info!(badge = created.badge, "User created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/users/:badge
pub async fn update_user(
    State(state): State<AppState>,
    Path(badge): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let patch = UserPatch {
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        position: payload.position,
        read_only: payload.read_only,
    };

    let updated = db::users::update_user(&state.db, badge, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with badge {} not found", badge)))?;

    Ok(Json(updated))
}

/// DELETE /api/users/:badge
pub async fn delete_user(
    State(state): State<AppState>,
    Path(badge): Path<i64>,
) -> ApiResult<StatusCode> {
    if !db::users::delete_user(&state.db, badge).await? {
        return Err(ApiError::NotFound(format!(
            "User with badge {} not found",
            badge
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Build user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/:badge",
            get(get_user).put(update_user).delete(delete_user),
        )
}
