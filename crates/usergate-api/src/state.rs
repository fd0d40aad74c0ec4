//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use usergate_auth::{AccessControl, PasswordHasher};
use usergate_db::UserRepository;

/// Prometheus render handle
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<PasswordHasher>,
    pub access: Arc<AccessControl>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<PasswordHasher>,
        access: Arc<AccessControl>,
    ) -> Self {
        Self {
            users,
            hasher,
            access,
        }
    }
}
