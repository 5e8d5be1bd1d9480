//! Profile endpoints.

use axum::Json;
use axum::extract::State;

use ridematch_core::schemas::{UserPublic, UserResponse, UserUpdate};

use crate::error::ApiError;
use crate::extract::{ActiveUser, UserId, ValidatedJson};
use crate::state::AppState;

/// `GET /me`
pub async fn get_me(ActiveUser(user): ActiveUser) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// `PUT /me`
pub async fn update_me(
    State(state): State<AppState>,
    ActiveUser(user): ActiveUser,
    ValidatedJson(update): ValidatedJson<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state.accounts.update_profile(&user, update).await?;
    Ok(Json(UserResponse::from(&updated)))
}

/// `GET /{user_id}`
pub async fn get_user(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    ActiveUser(_caller): ActiveUser,
) -> Result<Json<UserPublic>, ApiError> {
    Ok(Json(state.accounts.get_public_profile(user_id).await?))
}
