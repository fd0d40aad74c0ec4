//! Authentication error types

use axum::http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Realm advertised in `WWW-Authenticate` challenges
pub const REALM: &str = "usergate";

/// Body message for authenticated requests that lack the required role
pub const ACCESS_DENIED_MESSAGE: &str =
    "You do not have the required permissions to access this resource.";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredentials,

    #[error("Invalid authorization header format")]
    MalformedCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access denied to {path}")]
    AccessDenied { path: String },

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Invalid credential configuration: {0}")]
    InvalidCredentialConfig(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::MalformedCredentials
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::AccessDenied { .. } => StatusCode::FORBIDDEN,
            AuthError::PasswordHash(_) | AuthError::InvalidCredentialConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        match self {
            AuthError::MissingCredentials
            | AuthError::MalformedCredentials
            | AuthError::InvalidCredentials => {
                let challenge = format!("Basic realm=\"{}\"", REALM);
                let mut response = status.into_response();
                if let Ok(value) = HeaderValue::from_str(&challenge) {
                    response.headers_mut().insert(WWW_AUTHENTICATE, value);
                }
                response
            }
            AuthError::AccessDenied { path } => {
                let body = axum::Json(json!({
                    "status": status.as_u16(),
                    "error": "Access Denied",
                    "message": ACCESS_DENIED_MESSAGE,
                    "path": path,
                }));
                (status, body).into_response()
            }
            AuthError::PasswordHash(_) | AuthError::InvalidCredentialConfig(_) => {
                tracing::error!("Authentication failure: {}", detail);
                let body = axum::Json(json!({
                    "status": status.as_u16(),
                    "error": "Internal server error",
                }));
                (status, body).into_response()
            }
        }
    }
}
