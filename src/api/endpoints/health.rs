//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
}

/// `GET /health` — liveness check for the frontend and deploy probes.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Veterinary Neurological Diagnostic Assistant API is running",
        version: crate::config::APP_VERSION,
    })
}
