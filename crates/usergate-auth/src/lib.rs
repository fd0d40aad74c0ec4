//! usergate authentication and authorization
//!
//! HTTP Basic authentication against a fixed, startup-built credential
//! table, followed by first-match route authorization.

pub mod basic;
pub mod credentials;
pub mod error;
pub mod middleware;
pub mod password;
pub mod principal;
pub mod rules;

pub use basic::BasicCredentials;
pub use credentials::{CredentialSpec, CredentialStore, StoredCredential};
pub use error::AuthError;
pub use middleware::{AccessControl, access_gate};
pub use password::{HashingParams, PasswordHasher};
pub use principal::{Principal, Role};
pub use rules::{PathPattern, Requirement, RouteRules};
