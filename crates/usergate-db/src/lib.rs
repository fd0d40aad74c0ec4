//! usergate persistence layer
//!
//! Stores registered application users in SQLite via sqlx. This store is
//! independent from the static credential table used for HTTP Basic
//! authentication.

pub mod error;
pub mod models;
pub mod repository;

pub use error::DbError;
pub use models::{NewUser, User};
pub use repository::{Database, UserRepository};

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
