//! opsdeck-portal - Team portal backend service

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use opsdeck_portal::config::Config;
use opsdeck_portal::services::llm::LlmClient;
use opsdeck_portal::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting opsdeck-portal");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    info!("Database: {}", config.database_path.display());

    // Initialize database connection pool
    let db_pool = opsdeck_portal::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    // Single generation backend client handle, stateless aside from configuration
    let llm = Arc::new(
        LlmClient::new(&config.summary)
            .map_err(|e| anyhow::anyhow!("Failed to create generation backend client: {}", e))?,
    );
    info!(model = %config.summary.model, "Generation backend configured");

    // Create application state
    let state = AppState::new(db_pool, llm);

    // Build router
    let app = opsdeck_portal::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
