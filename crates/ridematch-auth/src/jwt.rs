//! HMAC JWT issuing and decoding.
//!
//! Access tokens are short-lived and carry `sub`, `email`, `is_admin`, and
//! `type = "access"`. Refresh tokens are long-lived and carry only `sub` and
//! `type = "refresh"`. `sub` is the user id rendered as a string.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use ridematch_core::Settings;
use ridematch_core::schemas::TokenData;

use crate::{AuthError, AuthenticatedUser, TokenValidator};

/// The two token kinds the service issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived bearer token for API calls.
    Access,
    /// Long-lived token exchanged for new access tokens.
    Refresh,
}

impl TokenKind {
    /// Value of the `type` claim.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Email (access tokens only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Admin flag (access tokens only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    /// `access` or `refresh`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    /// Expiry, seconds since the epoch. Checked when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Issued-at, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Parse `sub` as a user id.
    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub
            .as_deref()
            .and_then(|sub| sub.parse().ok())
            .ok_or(AuthError::InvalidSubject)
    }
}

/// Issues and decodes the service's JWTs.
pub struct JwtCodec {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: TimeDelta,
    refresh_ttl: TimeDelta,
}

impl fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtCodec")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl JwtCodec {
    /// Create a codec for an HMAC algorithm name (`HS256`, `HS384`, `HS512`).
    pub fn new(
        secret: &str,
        algorithm: &str,
        access_ttl: TimeDelta,
        refresh_ttl: TimeDelta,
    ) -> Result<Self, AuthError> {
        let algorithm = match algorithm.to_ascii_uppercase().as_str() {
            "HS256" => Algorithm::HS256,
            "HS384" => Algorithm::HS384,
            "HS512" => Algorithm::HS512,
            _ => return Err(AuthError::UnsupportedAlgorithm(algorithm.to_string())),
        };

        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        })
    }

    /// Create a codec from service settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, AuthError> {
        Self::new(
            &settings.jwt_secret_key,
            &settings.jwt_algorithm,
            TimeDelta::minutes(settings.access_token_expire_minutes),
            TimeDelta::minutes(settings.refresh_token_expire_minutes),
        )
    }

    /// Access token lifetime in seconds (`expires_in`).
    pub fn access_expires_in(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Refresh token lifetime.
    pub fn refresh_ttl(&self) -> TimeDelta {
        self.refresh_ttl
    }

    /// Issue an access token with the default lifetime.
    pub fn create_access_token(
        &self,
        user_id: i64,
        email: &str,
        is_admin: bool,
    ) -> Result<String, AuthError> {
        self.create_access_token_with_ttl(user_id, email, is_admin, self.access_ttl)
    }

    /// Issue an access token with an explicit lifetime.
    pub fn create_access_token_with_ttl(
        &self,
        user_id: i64,
        email: &str,
        is_admin: bool,
        ttl: TimeDelta,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: Some(user_id.to_string()),
            email: Some(email.to_string()),
            is_admin: Some(is_admin),
            token_type: Some(TokenKind::Access.to_string()),
            exp: Some((now + ttl).timestamp()),
            iat: Some(now.timestamp()),
        };
        self.sign(&claims)
    }

    /// Issue a refresh token with the default lifetime.
    pub fn create_refresh_token(&self, user_id: i64) -> Result<String, AuthError> {
        self.create_refresh_token_with_ttl(user_id, self.refresh_ttl)
    }

    /// Issue a refresh token with an explicit lifetime.
    pub fn create_refresh_token_with_ttl(
        &self,
        user_id: i64,
        ttl: TimeDelta,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: Some(user_id.to_string()),
            email: None,
            is_admin: None,
            token_type: Some(TokenKind::Refresh.to_string()),
            exp: Some((now + ttl).timestamp()),
            iat: Some(now.timestamp()),
        };
        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    /// Verify the signature and expiry, returning the raw claims.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => AuthError::InvalidFormat(e.to_string()),
                _ => AuthError::InvalidSignature(e.to_string()),
            })
    }

    /// Decode and check an access token. A missing `type` claim is read as
    /// an access token.
    pub fn verify_access(&self, token: &str) -> Result<TokenData, AuthError> {
        let claims = self.decode_claims(token)?;
        let user_id = claims.user_id()?;

        let kind = claims.token_type.as_deref().unwrap_or("access");
        if kind != TokenKind::Access.as_str() {
            return Err(AuthError::WrongTokenType {
                expected: TokenKind::Access.to_string(),
                got: kind.to_string(),
            });
        }

        Ok(TokenData {
            user_id: Some(user_id),
            email: claims.email,
            is_admin: claims.is_admin.unwrap_or(false),
            token_type: Some(TokenKind::Access.to_string()),
        })
    }

    /// Decode and check a refresh token, returning its user id.
    pub fn verify_refresh(&self, token: &str) -> Result<i64, AuthError> {
        let claims = self.decode_claims(token)?;
        let user_id = claims.user_id()?;

        match claims.token_type.as_deref() {
            Some("refresh") => Ok(user_id),
            other => Err(AuthError::WrongTokenType {
                expected: TokenKind::Refresh.to_string(),
                got: other.unwrap_or("none").to_string(),
            }),
        }
    }

    /// Access token payload, or `None` if the token is unusable.
    pub fn decode_access_token(&self, token: &str) -> Option<TokenData> {
        self.verify_access(token).ok()
    }

    /// Refresh token user id, or `None` if the token is unusable.
    pub fn decode_refresh_token(&self, token: &str) -> Option<i64> {
        self.verify_refresh(token).ok()
    }
}

impl TokenValidator for JwtCodec {
    fn validate(
        &self,
        token: &str,
    ) -> Pin<Box<dyn Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>> {
        let result = self.verify_access(token).and_then(|data| {
            let user_id = data.user_id.ok_or(AuthError::InvalidSubject)?;
            Ok(AuthenticatedUser {
                user_id,
                email: data.email,
                is_admin: data.is_admin,
            })
        });
        Box::pin(async move { result })
    }
}
