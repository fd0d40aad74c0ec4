//! Access control middleware for Axum

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::basic::BasicCredentials;
use crate::credentials::CredentialStore;
use crate::error::AuthError;
use crate::principal::Principal;
use crate::rules::RouteRules;

/// Credential table plus route rules, shared by every request
#[derive(Debug)]
pub struct AccessControl {
    credentials: CredentialStore,
    rules: RouteRules,
}

impl AccessControl {
    pub fn new(credentials: CredentialStore, rules: RouteRules) -> Self {
        Self { credentials, rules }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }
}

fn record_auth_failure(reason: &'static str) {
    metrics::counter!("usergate_auth_failures_total", "reason" => reason).increment(1);
}

/// Pull Basic credentials out of the request headers
fn basic_credentials(request: &Request) -> Result<BasicCredentials, AuthError> {
    let Some(header) = request.headers().get(AUTHORIZATION) else {
        record_auth_failure("missing");
        return Err(AuthError::MissingCredentials);
    };

    header
        .to_str()
        .map_err(|_| AuthError::MalformedCredentials)
        .and_then(BasicCredentials::parse)
        .inspect_err(|_| record_auth_failure("malformed"))
}

/// Verify credentials against the store.
///
/// Hash verification is CPU-bound, so it runs on the blocking pool.
async fn authenticate(
    access: &Arc<AccessControl>,
    credentials: BasicCredentials,
) -> Result<Principal, AuthError> {
    let access = Arc::clone(access);
    tokio::task::spawn_blocking(move || {
        access
            .credentials
            .authenticate(&credentials.username, &credentials.password)
    })
    .await
    .map_err(|e| AuthError::PasswordHash(format!("verification task failed: {}", e)))?
    .inspect_err(|_| record_auth_failure("invalid"))
}

/// Access control gate
///
/// Resolves the route requirement for the request path. Public routes pass
/// straight through. Everything else must carry valid Basic credentials
/// (401 otherwise) and, for role-restricted routes, a permitted role
/// (403 otherwise). On success the [`Principal`] is added to request
/// extensions.
pub async fn access_gate(
    State(access): State<Arc<AccessControl>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let path = request.uri().path().to_string();
    let requirement = access.rules.requirement_for(&path);

    if !requirement.requires_authentication() {
        return Ok(next.run(request).await);
    }

    let credentials = basic_credentials(&request)?;
    let principal = authenticate(&access, credentials).await?;

    if !requirement.permits(principal.role) {
        warn!(
            "Access denied: {} ({}) on {}",
            principal.username, principal.role, path
        );
        metrics::counter!("usergate_access_denied_total").increment(1);
        return Err(AuthError::AccessDenied { path });
    }

    debug!(
        "Authenticated user: {} ({}) on {}",
        principal.username,
        principal.role,
        path
    );

    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}
