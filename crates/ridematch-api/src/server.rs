//! API server assembly and lifecycle.

use axum::Router;
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use http::{HeaderValue, StatusCode};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use ridematch_core::Settings;

use crate::Result;
use crate::error::ErrorDetail;
use crate::routes;
use crate::state::AppState;

/// The full application: routes plus CORS, request tracing, and (in debug
/// mode) error detail exposure.
pub fn app(state: AppState) -> Router {
    let settings = state.settings.clone();
    let mut router = routes::router(state);

    if settings.debug {
        router = router.layer(middleware::from_fn(expose_error_detail));
    }

    router
        .layer(cors_layer(&settings))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured origins, with credentials and mirrored
/// methods/headers. A `*` origin mirrors the request origin.
pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let origin = if settings.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = settings
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    log::warn!("Ignoring invalid CORS origin '{origin}'");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Replace the generic 500 body with the underlying error text.
async fn expose_error_detail(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    match response.extensions_mut().remove::<ErrorDetail>() {
        Some(ErrorDetail(detail)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(serde_json::json!({ "detail": detail })),
        )
            .into_response(),
        None => response,
    }
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(state: AppState) -> Result<()> {
    let address = state.settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    log::info!(
        "{} v{} listening on {address}",
        state.settings.app_name,
        state.settings.app_version
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
