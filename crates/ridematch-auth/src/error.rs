//! Auth-specific error types.

/// Errors that can occur during authentication.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// No Authorization header or bearer token present.
    #[error("missing authentication token")]
    MissingToken,

    /// Token format is invalid (not a valid JWT).
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// JWT signature verification failed.
    #[error("invalid token signature: {0}")]
    InvalidSignature(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token decoded but is of the wrong kind (access vs refresh).
    #[error("wrong token type: expected '{expected}', got '{got}'")]
    WrongTokenType {
        /// Kind the caller asked for.
        expected: String,
        /// Kind found in the `type` claim.
        got: String,
    },

    /// The `sub` claim is missing or not a user id.
    #[error("token subject is missing or invalid")]
    InvalidSubject,

    /// Signing algorithm is not one of HS256/HS384/HS512.
    #[error("unsupported JWT algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    /// Failed to sign a token.
    #[error("failed to encode token: {0}")]
    Encoding(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The refresh-token store could not be reached.
    #[error("token store unavailable: {0}")]
    TokenStore(String),
}

impl AuthError {
    /// Whether this error should result in a 401 (vs. a 500).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidFormat(_)
                | AuthError::InvalidSignature(_)
                | AuthError::Expired
                | AuthError::WrongTokenType { .. }
                | AuthError::InvalidSubject
        )
    }

    /// Wrap a token-store backend failure.
    pub fn token_store(err: impl std::fmt::Display) -> Self {
        AuthError::TokenStore(err.to_string())
    }
}
