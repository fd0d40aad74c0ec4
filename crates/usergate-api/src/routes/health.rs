//! Liveness and readiness probes
//!
//! `/healthz` only proves the process is serving. `/health` also touches the
//! user store and answers 503 when it cannot be reached.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::error;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
}

impl HealthResponse {
    fn new(status: &'static str, database: Option<&'static str>) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database,
        }
    }
}

/// GET /healthz
async fn liveness() -> Json<HealthResponse> {
    metrics::counter!("usergate_health_checks_total", "probe" => "liveness").increment(1);
    Json(HealthResponse::new("healthy", None))
}

/// GET /health
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    metrics::counter!("usergate_health_checks_total", "probe" => "readiness").increment(1);

    match state.users.count().await {
        Ok(_) => (StatusCode::OK, Json(HealthResponse::new("healthy", Some("ok")))),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::new("unhealthy", Some("unavailable"))),
            )
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(readiness))
        .route("/healthz", get(liveness))
}
