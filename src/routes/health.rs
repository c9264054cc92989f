use axum::{extract::State, response::Json};
use serde::Serialize;

use crate::db::PoolSnapshot;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    /// Request lease counters, not sqlx pool checkouts
    pub connections: PoolSnapshot,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        connections: state.pool.stats().snapshot(),
    })
}
