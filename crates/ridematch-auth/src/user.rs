//! Authenticated user identity and extraction helpers.

/// An authenticated user identity, extracted from a validated access token.
///
/// Stored in HTTP request extensions by the auth middleware. It reflects the
/// token's claims; handlers still load the user row to see current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The user's id (from the `sub` claim).
    pub user_id: i64,
    /// The user's email at token issuance.
    pub email: Option<String>,
    /// Admin flag at token issuance.
    pub is_admin: bool,
}

/// Extract the `AuthenticatedUser` from HTTP request `Parts`, if present.
pub fn user_from_parts(parts: &http::request::Parts) -> Option<&AuthenticatedUser> {
    parts.extensions.get::<AuthenticatedUser>()
}
