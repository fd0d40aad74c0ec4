//! Fixed-message endpoints for each access level

use axum::{Router, routing::get};

use crate::state::AppState;

pub const PUBLIC_MESSAGE: &str = "This is a public endpoint";
pub const USER_MESSAGE: &str = "This is a user endpoint";
pub const ADMIN_MESSAGE: &str = "This is an admin endpoint";

/// GET /public
async fn public_info() -> &'static str {
    PUBLIC_MESSAGE
}

/// GET /user (USER or ADMIN)
async fn user_info() -> &'static str {
    USER_MESSAGE
}

/// GET /admin (ADMIN only)
async fn admin_info() -> &'static str {
    ADMIN_MESSAGE
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/public", get(public_info))
        .route("/user", get(user_info))
        .route("/admin", get(admin_info))
}
