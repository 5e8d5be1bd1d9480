//! Registration, login, token refresh, and logout.

use axum::Json;
use axum::extract::State;
use http::StatusCode;

use ridematch_core::schemas::{
    AuthResponse, LoginForm, LoginRequest, MessageResponse, Token, TokenRefresh, UserCreate,
    normalize_email,
};

use crate::accounts::RevokedResponse;
use crate::error::ApiError;
use crate::extract::{CurrentUser, ValidatedForm, ValidatedJson};
use crate::state::AppState;

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UserCreate>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let response = state.accounts.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    Ok(Json(state.accounts.login(request).await?))
}

/// `POST /login/form`: OAuth2 password flow; `username` carries the email.
pub async fn login_form(
    State(state): State<AppState>,
    ValidatedForm(form): ValidatedForm<LoginForm>,
) -> Result<Json<Token>, ApiError> {
    let email = normalize_email(&form.username);
    Ok(Json(state.accounts.login_form(&email, &form.password).await?))
}

/// `POST /refresh`
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<TokenRefresh>,
) -> Result<Json<Token>, ApiError> {
    Ok(Json(state.accounts.refresh(&request.refresh_token).await?))
}

/// `POST /logout`
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(request): ValidatedJson<TokenRefresh>,
) -> Result<Json<MessageResponse>, ApiError> {
    Ok(Json(
        state.accounts.logout(&user, &request.refresh_token).await?,
    ))
}

/// `POST /logout/all`
pub async fn logout_all(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<RevokedResponse>, ApiError> {
    Ok(Json(state.accounts.logout_all(&user).await?))
}
