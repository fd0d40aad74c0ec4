//! API error types
//!
//! Every handler failure is translated here into a status code and a JSON
//! body. Authentication and authorization failures are produced by the
//! access gate and rendered by [`AuthError`] itself.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use usergate_auth::AuthError;
use usergate_db::DbError;
use validator::ValidationErrors;

/// Conflict message for a username collision caught by the storage layer
pub const USERNAME_TAKEN: &str = "This username is already taken.";

/// Conflict message for any other constraint collision
pub const CONSTRAINT_VIOLATED: &str = "A database constraint was violated.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Malformed request body: {0}")]
    Json(#[from] JsonRejection),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_values()
            .flat_map(|errs| errs.iter())
            .map(|err| {
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string())
            })
            .collect();
        messages.sort();
        ApiError::Validation(messages)
    }
}

/// Pick the conflict message for a storage-level unique violation
fn unique_violation_message(constraint: &str) -> &'static str {
    if constraint.contains("users_username_key") || constraint.contains("users.username") {
        USERNAME_TAKEN
    } else {
        warn!("Unrecognised unique constraint: {}", constraint);
        CONSTRAINT_VIOLATED
    }
}

fn conflict(message: &str) -> Response {
    let status = StatusCode::CONFLICT;
    let body = axum::Json(json!({
        "status": status.as_u16(),
        "error": message,
    }));
    (status, body).into_response()
}

fn internal() -> Response {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    let body = axum::Json(json!({
        "status": status.as_u16(),
        "error": "Internal server error",
    }));
    (status, body).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let status = StatusCode::BAD_REQUEST;
                let body = axum::Json(json!({
                    "status": status.as_u16(),
                    "errors": errors,
                }));
                (status, body).into_response()
            }
            ApiError::Json(rejection) => {
                let status = match &rejection {
                    JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    _ => StatusCode::BAD_REQUEST,
                };
                let body = axum::Json(json!({
                    "status": status.as_u16(),
                    "errors": [rejection.body_text()],
                }));
                (status, body).into_response()
            }
            ApiError::Conflict(message) => conflict(&message),
            ApiError::Database(DbError::UniqueViolation { constraint }) => {
                conflict(unique_violation_message(&constraint))
            }
            ApiError::Database(e) => {
                error!("Database error: {}", e);
                internal()
            }
            ApiError::Auth(e) => e.into_response(),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                internal()
            }
        }
    }
}
