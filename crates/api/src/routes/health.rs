//! Health endpoint reporting readiness of the two stores uploads
//! depend on: the database and the upload root on disk.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::AppState;

/// Readiness report for the service and its stores.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// `healthy` when both stores respond, `degraded` otherwise.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Database reachability.
    pub database: &'static str,
    /// Upload root availability.
    pub storage: &'static str,
}

/// GET `/health`. Always 200; degradation shows in the body so load
/// balancers keep routing while operators see the broken store.
async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let database = if state.db.ping().await.is_ok() {
        "up"
    } else {
        "down"
    };
    let storage = if state.storage.root().is_dir() {
        "up"
    } else {
        "down"
    };

    Json(HealthStatus {
        status: if database == "up" && storage == "up" {
            "healthy"
        } else {
            "degraded"
        },
        version: env!("CARGO_PKG_VERSION"),
        database,
        storage,
    })
}

/// Creates the health route.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
