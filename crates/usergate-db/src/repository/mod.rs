//! Database repository implementation

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use crate::error::DbError;
use crate::models::{NewUser, User};

mod users;

/// CRUD access to registered users.
///
/// `save` never checks for an existing username itself; uniqueness is left to
/// the storage constraint and reported as [`DbError::UniqueViolation`].
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look a user up by exact username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DbError>;

    /// Look a user up by id
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DbError>;

    /// List all users ordered by id
    async fn find_all(&self) -> Result<Vec<User>, DbError>;

    /// Insert a user and return it with its generated id
    async fn save(&self, user: NewUser) -> Result<User, DbError>;

    /// Delete a user, returning whether a row was removed
    async fn delete_by_id(&self, id: i64) -> Result<bool, DbError>;

    /// Number of stored users
    async fn count(&self) -> Result<i64, DbError>;
}

/// Database connection and operations
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to a SQLite database, creating the file if needed
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, DbError> {
        info!("Connecting to database: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open a private in-memory database.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Get the underlying pool for advanced usage
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<(), DbError> {
        info!("Running database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                password TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL,
                CONSTRAINT users_username_key UNIQUE (username)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database migrations completed");
        Ok(())
    }
}
