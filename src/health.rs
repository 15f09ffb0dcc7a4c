//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload for load balancers and
//! container orchestrators: a fixed `ok` status, the current time, the
//! build, and the process uptime.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub commit: String,
    pub profile: String,
    pub uptime_seconds: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: env!("GATEHOUSE_GIT_SHORT").to_string(),
        profile: state.profile.to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
