//! usergate REST API
//!
//! Axum routes for the public/user/admin information endpoints and user
//! registration, wrapped by the access control gate.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
