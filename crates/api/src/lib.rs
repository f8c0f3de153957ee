//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for files, companies, and contracts
//! - The `{status, message, data}` response envelope
//! - Error-to-status mapping

pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use pactfile_core::storage::StorageService;
use pactfile_shared::config::UploadConfig;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// Disk storage for uploaded files.
    pub storage: Arc<StorageService>,
    /// Upload limits and extension whitelist.
    pub upload: UploadConfig,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    // Multipart bodies carry the file plus form fields; leave headroom
    // above the configured file size limit.
    let body_limit = usize::try_from(state.upload.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(1024 * 1024);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
