//! User registration route

use axum::{Extension, Json, Router, extract::State, http::StatusCode, routing::post};
use tracing::{debug, info};
use usergate_auth::Principal;
use usergate_db::NewUser;

use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::state::AppState;

use super::types::{CreateUserRequest, UserResponse};

/// POST /users (Admin only)
///
/// The username pre-check gives a specific conflict message; a concurrent
/// insert that slips past it is still rejected by the storage constraint.
async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<Principal>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    debug!("Creating user {} on behalf of {}", request.username, caller.username);

    if state.users.find_by_username(&request.username).await?.is_some() {
        return Err(ApiError::Conflict(format!(
            "Username '{}' is already taken.",
            request.username
        )));
    }

    let hasher = state.hasher.clone();
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {}", e)))??;

    let user = state
        .users
        .save(NewUser {
            username: request.username,
            password_hash,
            role: request.role,
        })
        .await?;

    metrics::counter!("usergate_users_created_total").increment(1);
    info!("Created user {} (id {}) by {}", user.username, user.id, caller.username);

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Create user routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/users", post(create_user))
}
