//! `Authorization: Basic` header handling

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt;

use crate::error::AuthError;

/// Username and password carried by a Basic authorization header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse an `Authorization` header value.
    ///
    /// The scheme name is case-insensitive. The password is everything after
    /// the first `:`, so it may itself contain colons.
    pub fn parse(header: &str) -> Result<Self, AuthError> {
        let (scheme, encoded) = header
            .trim()
            .split_once(' ')
            .ok_or(AuthError::MalformedCredentials)?;

        if !scheme.eq_ignore_ascii_case("Basic") {
            return Err(AuthError::MalformedCredentials);
        }

        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::MalformedCredentials)?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

        let (username, password) = decoded
            .split_once(':')
            .ok_or(AuthError::MalformedCredentials)?;

        Ok(Self::new(username, password))
    }

    /// Render as an `Authorization` header value
    pub fn header_value(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", encoded)
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_header() {
        // "admin:admin123"
        let creds = BasicCredentials::parse("Basic YWRtaW46YWRtaW4xMjM=").unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "admin123");
    }

    #[test]
    fn test_header_value_round_trips() {
        let creds = BasicCredentials::new("intern", "pa:ss:word");
        let parsed = BasicCredentials::parse(&creds.header_value()).unwrap();
        assert_eq!(parsed, creds);
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let creds = BasicCredentials::parse("basic YWRtaW46YWRtaW4xMjM=").unwrap();
        assert_eq!(creds.username, "admin");
    }

    #[test]
    fn test_rejects_malformed_headers() {
        for header in [
            "Bearer abc.def.ghi",
            "Basic",
            "Basic !!!not-base64!!!",
            // "no-colon"
            "Basic bm8tY29sb24=",
            "",
        ] {
            assert!(
                matches!(BasicCredentials::parse(header), Err(AuthError::MalformedCredentials)),
                "header {:?} should be rejected",
                header
            );
        }
    }

    #[test]
    fn test_empty_password_is_allowed_by_parser() {
        // "admin:"
        let creds = BasicCredentials::parse("Basic YWRtaW46").unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "");
    }
}
