//! GET /health

use axum::Json;

use crate::types::HealthResponse;

/// Liveness check. Does not touch the identity provider.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}
