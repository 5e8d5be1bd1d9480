//! HTTP routes.
//!
//! | mount          | routes                                              |
//! |----------------|-----------------------------------------------------|
//! | `api_prefix`   | register, login, login/form, refresh, logout, logout/all |
//! | `/api/users`   | me (GET, PUT), `{user_id}`                          |
//! | `/health`      | dependency report                                   |

pub mod auth;
pub mod health;
pub mod users;

use axum::Router;
use axum::routing::{get, post};

use ridematch_auth::AuthLayer;

use crate::state::AppState;

/// Mount point of the users router.
pub const USERS_PREFIX: &str = "/api/users";

/// Build the route tree. Routes that need an access token sit behind
/// [`AuthLayer`].
pub fn router(state: AppState) -> Router {
    let auth_layer = AuthLayer::new(state.accounts.jwt());

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/login/form", post(auth::login_form))
        .route("/refresh", post(auth::refresh))
        .merge(
            Router::new()
                .route("/logout", post(auth::logout))
                .route("/logout/all", post(auth::logout_all))
                .route_layer(auth_layer.clone()),
        );

    let user_routes = Router::new()
        .route("/me", get(users::get_me).put(users::update_me))
        .route("/{user_id}", get(users::get_user))
        .route_layer(auth_layer);

    let prefix = state.settings.api_prefix.trim_matches('/');
    let api = if prefix.is_empty() {
        auth_routes
    } else {
        Router::new().nest(&format!("/{prefix}"), auth_routes)
    };

    api.nest(USERS_PREFIX, user_routes)
        .route("/health", get(health::health_check))
        .with_state(state)
}
