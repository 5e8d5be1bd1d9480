//! Service health.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Per-dependency status, `"ok"` or `"error"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    /// PostgreSQL.
    pub database: String,
    /// Redis.
    pub redis: String,
}

/// Body of `GET /health`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// `"healthy"` when every dependency is up, `"degraded"` otherwise.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Dependency detail.
    pub dependencies: Dependencies,
}

fn status_word(ok: bool) -> String {
    if ok { "ok" } else { "error" }.to_string()
}

/// `GET /health`. Always 200; degradation is reported in the body.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    let check = state.accounts.check_dependencies().await;
    let healthy = check.database && check.redis;

    Json(HealthReport {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        service: state.settings.app_name.clone(),
        version: state.settings.app_version.clone(),
        dependencies: Dependencies {
            database: status_word(check.database),
            redis: status_word(check.redis),
        },
    })
}
