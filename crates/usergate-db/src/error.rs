//! Database error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    /// A write was rejected by a UNIQUE constraint. `constraint` carries the
    /// constraint name when the driver reports one, otherwise the driver message.
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
}

impl DbError {
    /// Classify an error raised by an INSERT or UPDATE.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            let constraint = db_err
                .constraint()
                .map(str::to_string)
                .unwrap_or_else(|| db_err.message().to_string());
            return DbError::UniqueViolation { constraint };
        }
        DbError::Connection(err)
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation { .. })
    }
}
