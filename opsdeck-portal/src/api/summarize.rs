//! AI roll-up endpoint

use axum::{extract::State, routing::post, Json, Router};

use crate::services::summarizer::{summarize, SummarizeRequest, SummarizeResponse};
use crate::{ApiError, ApiResult, AppState};

/// POST /api/ai/summarize-accomplishments
///
/// The detailed failure cause is logged server-side only; callers get one
/// opaque message so upstream provider error bodies never leak to end users.
pub async fn summarize_accomplishments(
    State(state): State<AppState>,
    Json(payload): Json<SummarizeRequest>,
) -> ApiResult<Json<SummarizeResponse>> {
    match summarize(&state.llm, &payload).await {
        Ok(result) => Ok(Json(result)),
        Err(err) => {
            tracing::error!(error = %err, "Accomplishment summarization failed");
            Err(ApiError::Internal("summarization failed".to_string()))
        }
    }
}

/// Build summarize routes
pub fn summarize_routes() -> Router<AppState> {
    Router::new().route("/api/ai/summarize-accomplishments", post(summarize_accomplishments))
}
