//! Static credential table for HTTP Basic authentication
//!
//! Built once at startup from configuration and never modified. Registered
//! application users are not part of this table.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::principal::{Principal, Role};

/// Plaintext used to build the dummy hash checked for unknown usernames
const DUMMY_PASSWORD: &str = "usergate-unknown-user";

/// A configured identity, with its password still in plaintext
#[derive(Clone, Deserialize)]
pub struct CredentialSpec {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl CredentialSpec {
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
        }
    }

    /// The two built-in identities
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("intern", "password123", Role::User),
            Self::new("admin", "admin123", Role::Admin),
        ]
    }
}

impl fmt::Debug for CredentialSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSpec")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// A table entry
#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub password_hash: String,
    pub role: Role,
}

/// Immutable username → credential table
#[derive(Debug)]
pub struct CredentialStore {
    entries: HashMap<String, StoredCredential>,
    hasher: PasswordHasher,
    dummy_hash: String,
}

impl CredentialStore {
    /// Hash every configured password and build the table.
    ///
    /// Rejects an empty list, blank usernames or passwords, and duplicate
    /// usernames.
    pub fn from_specs(specs: &[CredentialSpec], hasher: PasswordHasher) -> Result<Self, AuthError> {
        if specs.is_empty() {
            return Err(AuthError::InvalidCredentialConfig(
                "at least one credential must be configured".to_string(),
            ));
        }

        let mut entries = HashMap::with_capacity(specs.len());
        for spec in specs {
            if spec.username.trim().is_empty() {
                return Err(AuthError::InvalidCredentialConfig(
                    "credential username cannot be blank".to_string(),
                ));
            }
            if spec.password.trim().is_empty() {
                return Err(AuthError::InvalidCredentialConfig(format!(
                    "password for '{}' cannot be blank",
                    spec.username
                )));
            }
            if entries.contains_key(&spec.username) {
                return Err(AuthError::InvalidCredentialConfig(format!(
                    "duplicate credential for '{}'",
                    spec.username
                )));
            }

            let password_hash = hasher.hash(&spec.password)?;
            entries.insert(
                spec.username.clone(),
                StoredCredential {
                    password_hash,
                    role: spec.role,
                },
            );
        }

        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        info!("Loaded {} static credentials", entries.len());

        Ok(Self {
            entries,
            hasher,
            dummy_hash,
        })
    }

    pub fn lookup(&self, username: &str) -> Option<&StoredCredential> {
        self.entries.get(username)
    }

    /// Verify a username/password pair.
    ///
    /// Exactly one hash verification runs whether or not the username exists.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let entry = self.lookup(username);
        let hash = entry
            .map(|c| c.password_hash.as_str())
            .unwrap_or(self.dummy_hash.as_str());

        let valid = self.hasher.verify(password, hash);

        match (entry, valid) {
            (Some(credential), true) => Ok(Principal {
                username: username.to_string(),
                role: credential.role,
            }),
            _ => {
                debug!("Rejected credentials for user: {}", username);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
