//! Authentication primitives for RideMatch.
//!
//! Provides:
//! - [`AuthenticatedUser`]: Identity extracted from a validated access token
//! - [`TokenValidator`]: Trait for async token validation
//! - [`JwtCodec`]: HMAC JWT issuing/decoding; the service's `TokenValidator`
//! - [`PasswordHasher`]: bcrypt hashing on the blocking pool
//! - [`RefreshTokenStore`]: Revocation tracking for refresh tokens, with an
//!   in-memory implementation ([`MemoryTokenStore`])
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware parameterised over `TokenValidator`
//! - [`AuthError`]: Auth-specific error types

mod error;
pub mod jwt;
mod middleware;
pub mod password;
pub mod store;
mod user;

pub use error::AuthError;
pub use jwt::{Claims, JwtCodec, TokenKind};
pub use middleware::{AuthLayer, AuthService};
pub use password::PasswordHasher;
pub use store::{MemoryTokenStore, REFRESH_TOKEN_PREFIX, RefreshTokenStore, token_key};
pub use user::{AuthenticatedUser, user_from_parts};

/// Trait for validating tokens and extracting user identity.
///
/// The middleware calls `validate()` with the bearer token and stores the
/// authenticated user in the request extensions on success.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the authenticated user.
    fn validate(
        &self,
        token: &str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>,
    >;
}
