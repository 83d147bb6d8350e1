//! Weekly accomplishment endpoints
//!
//! POST is an upsert: resubmitting the same user/week pair updates the
//! existing timesheet instead of creating another.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::db::{self, accomplishments::WeeklyAccomplishment};
use crate::services::accomplishments::{reconcile, ReconcileInput};
use crate::{ApiResult, AppState};

/// POST /api/accomplishments
pub async fn submit_accomplishment(
    State(state): State<AppState>,
    Json(payload): Json<ReconcileInput>,
) -> ApiResult<Json<WeeklyAccomplishment>> {
    let saved = reconcile(&state.db, payload).await?;
    Ok(Json(saved))
}

/// GET /api/accomplishments/user/:badge
pub async fn user_accomplishments(
    State(state): State<AppState>,
    Path(badge): Path<i64>,
) -> ApiResult<Json<Vec<WeeklyAccomplishment>>> {
    let recs = db::accomplishments::list_for_user(&state.db, badge).await?;
    Ok(Json(recs))
}

/// Build accomplishment routes
pub fn accomplishment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/accomplishments", post(submit_accomplishment))
        .route("/api/accomplishments/user/:badge", get(user_accomplishments))
}
