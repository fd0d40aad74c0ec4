//! API routes

mod health;
mod info;
pub mod metrics;
pub mod types;
mod users;

use axum::{Router, http::StatusCode, middleware::from_fn_with_state};
use std::sync::Arc;
use usergate_auth::access_gate;

use crate::state::{AppState, MetricsHandle};

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Create the main router.
///
/// Every route, the metrics endpoint and the fallback sit behind the access
/// gate.
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let access = state.access.clone();

    let mut router = Router::new()
        .merge(health::routes())
        .merge(info::routes())
        .merge(users::routes())
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
        .fallback(not_found)
        .layer(from_fn_with_state(access, access_gate))
}
