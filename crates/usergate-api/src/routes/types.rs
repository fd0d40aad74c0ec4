//! Request/Response DTOs

use serde::{Deserialize, Deserializer, Serialize};
use usergate_db::User;
use validator::{Validate, ValidationError};

/// Treat a missing or `null` string field as empty so it is reported by
/// validation rather than by the JSON parser.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(
        custom(function = "not_blank", message = "Username cannot be blank"),
        length(min = 3, max = 20, message = "Username must be between 3 and 20 characters")
    )]
    pub username: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(
        custom(function = "not_blank", message = "Password cannot be blank"),
        length(min = 4, message = "Password must be at least 4 characters long")
    )]
    pub password: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    #[validate(custom(function = "not_blank", message = "Role cannot be blank"))]
    pub role: String,
}

/// Created user.
///
/// `password` is the stored hash, never the submitted plaintext.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            password: user.password,
            role: user.role,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(json: &str) -> Vec<String> {
        let request: CreateUserRequest = serde_json::from_str(json).unwrap();
        match request.validate() {
            Ok(()) => vec![],
            Err(errors) => {
                let mut all: Vec<String> = errors
                    .field_errors()
                    .into_values()
                    .flat_map(|errs| errs.iter())
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                all.sort();
                all
            }
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(messages(r#"{"username":"bob","password":"abcd","role":"USER"}"#).is_empty());
    }

    #[test]
    fn test_short_username_and_password() {
        assert_eq!(
            messages(r#"{"username":"ab","password":"abc","role":"USER"}"#),
            vec![
                "Password must be at least 4 characters long",
                "Username must be between 3 and 20 characters",
            ]
        );
    }

    #[test]
    fn test_username_upper_bound_counts_characters() {
        let twenty = "é".repeat(20);
        let body = format!(r#"{{"username":"{}","password":"abcd","role":"USER"}}"#, twenty);
        assert!(messages(&body).is_empty());

        let body = format!(r#"{{"username":"{}","password":"abcd","role":"USER"}}"#, "a".repeat(21));
        assert_eq!(messages(&body), vec!["Username must be between 3 and 20 characters"]);
    }

    #[test]
    fn test_missing_and_null_fields_are_blank() {
        let found = messages(r#"{"username":null,"id":7}"#);
        assert!(found.contains(&"Username cannot be blank".to_string()));
        assert!(found.contains(&"Password cannot be blank".to_string()));
        assert!(found.contains(&"Role cannot be blank".to_string()));
    }

    #[test]
    fn test_whitespace_role_is_blank() {
        assert_eq!(
            messages(r#"{"username":"bob","password":"abcd","role":"   "}"#),
            vec!["Role cannot be blank"]
        );
    }
}
