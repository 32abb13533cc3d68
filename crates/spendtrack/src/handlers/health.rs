//! Health check endpoints.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/api/healthz/` - Reports the deployment mode the providers run in

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use spendtrack_core::deployment::DeploymentMode;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub mode: DeploymentMode,
}

/// GET /livez - Basic liveness probe.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /api/healthz/
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        mode: state.mode(),
    })
}
