//! Pactfile API Server
//!
//! Main entry point for the Pactfile backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pactfile_api::{AppState, create_router};
use pactfile_core::storage::StorageService;
use pactfile_db::connect;
use pactfile_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pactfile=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database).await?;
    info!("Connected to database");

    // Set up disk storage for uploads
    let storage = StorageService::new(&config.upload.root)?;
    info!(root = %storage.root().display(), "Upload storage ready");

    // Create application state
    let state = AppState {
        db,
        storage: Arc::new(storage),
        upload: config.upload.clone(),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
