//! Error types for ridematch-storage

use thiserror::Error;

/// Result type alias for ridematch-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in ridematch-storage
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Another user already has this email.
    #[error("email already registered")]
    EmailTaken,

    /// No user with this id.
    #[error("user {0} not found")]
    NotFound(i64),

    /// Query or connection failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying or reverting migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The in-memory backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl Error {
    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Whether the failure is in the storage layer itself rather than in
    /// the request.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Migration(_) | Self::Backend(_)
        )
    }
}
