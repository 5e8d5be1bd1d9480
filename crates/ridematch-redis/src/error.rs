//! Error types for the Redis backend.

/// Result alias for Redis backend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from the Redis backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The connection URL could not be parsed.
    #[error("invalid redis url: {0}")]
    InvalidUrl(String),

    /// A command or connection failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl From<Error> for ridematch_auth::AuthError {
    fn from(err: Error) -> Self {
        ridematch_auth::AuthError::token_store(err)
    }
}
