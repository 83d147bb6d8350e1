//! Server inventory endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::{
    self,
    servers::{NewServer, Server},
};
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ServerListQuery {
    /// Substring filter over hostname, ip_address, and role
    #[serde(default)]
    pub q: Option<String>,
}

/// Request payload for registering a server
#[derive(Debug, Deserialize)]
pub struct CreateServerRequest {
    pub hostname: String,
    pub ip_address: String,
    pub os: String,
    pub status: String,
    pub environment: String,
    pub role: String,
    pub location: String,
    #[serde(default)]
    pub folder: Option<String>,
}

/// GET /api/servers?q=
pub async fn list_servers(
    State(state): State<AppState>,
    Query(query): Query<ServerListQuery>,
) -> ApiResult<Json<Vec<Server>>> {
    let servers = db::servers::list_servers(&state.db, query.q.as_deref()).await?;
    Ok(Json(servers))
}

/// POST /api/servers
pub async fn create_server(
    State(state): State<AppState>,
    Json(payload): Json<CreateServerRequest>,
) -> ApiResult<(StatusCode, Json<Server>)> {
    let server = NewServer {
        hostname: payload.hostname,
        ip_address: payload.ip_address,
        os: payload.os,
        status: payload.status,
        environment: payload.environment,
        role: payload.role,
        location: payload.location,
        folder: payload.folder,
    };

    let created = db::servers::insert_server(&state.db, &server).await?;
    tracing::info!(hostname = %created.hostname, "Server registered");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Build server routes
pub fn server_routes() -> Router<AppState> {
    Router::new().route("/api/servers", get(list_servers).post(create_server))
}
