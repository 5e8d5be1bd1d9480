//! Request extractors.
//!
//! Body extractors validate and normalize the payload before the handler
//! sees it. User extractors read the identity the auth middleware stored
//! and load the current user row.

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::{Form, Json};
use http::request::Parts;
use serde::de::DeserializeOwned;

use ridematch_auth::user_from_parts;
use ridematch_core::{User, Validate};

use crate::error::ApiError;
use crate::state::AppState;

/// A JSON body that deserialized and passed [`Validate`].
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value.validate()?))
    }
}

/// A url-encoded form body that deserialized and passed [`Validate`].
#[derive(Debug)]
pub struct ValidatedForm<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedForm<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state).await?;
        Ok(Self(value.validate()?))
    }
}

/// The integer `{user_id}` path segment.
#[derive(Clone, Copy, Debug)]
pub struct UserId(pub i64);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state).await?;
        Ok(Self(id))
    }
}

/// The user named by a valid access token. Active or not.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = user_from_parts(parts)
            .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

        state
            .accounts
            .find_user(identity.user_id)
            .await?
            .map(Self)
            .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))
    }
}

/// A [`CurrentUser`] whose account is active.
#[derive(Clone, Debug)]
pub struct ActiveUser(pub User);

impl FromRequestParts<AppState> for ActiveUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_active {
            return Err(ApiError::forbidden("Account is deactivated"));
        }
        Ok(Self(user))
    }
}
