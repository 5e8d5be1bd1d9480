//! Error types for ridematch-api
//!
//! [`Error`] covers startup and CLI failures. [`ApiError`] is what handlers
//! return; it renders as a JSON body of the form `{"detail": ...}`.

use axum::Json;
use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection};
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

use ridematch_auth::AuthError;
use ridematch_core::ValidationErrors;

/// Result type alias for ridematch-api operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while starting or administering the service
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from ridematch-core
    #[error("Core error: {0}")]
    Core(#[from] ridematch_core::Error),

    /// Error from ridematch-auth
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Error from ridematch-storage
    #[error("Storage error: {0}")]
    Storage(#[from] ridematch_storage::Error),

    /// Error from ridematch-redis
    #[error("Redis error: {0}")]
    Redis(#[from] ridematch_redis::Error),

    /// Binding or serving failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Full error text for a 500 response, attached as a response extension.
/// Surfaced only when the service runs with `debug` on.
#[derive(Clone, Debug)]
pub struct ErrorDetail(pub String);

/// An error returned from a request handler.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    /// Request body, form, or path failed validation (422).
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// 400.
    #[error("{0}")]
    BadRequest(String),

    /// 401, with `WWW-Authenticate: Bearer`.
    #[error("{0}")]
    Unauthorized(String),

    /// 403.
    #[error("{0}")]
    Forbidden(String),

    /// 404.
    #[error("{0}")]
    NotFound(String),

    /// 409.
    #[error("{0}")]
    Conflict(String),

    /// Storage failure. Client-caused variants map to 409/404, backend
    /// failures to 503.
    #[error(transparent)]
    Storage(#[from] ridematch_storage::Error),

    /// Token or hashing failure.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Anything else (500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// 401 error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// 403 error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// 422 error for a single field.
    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, message))
    }

    /// The HTTP status this error renders as.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(ridematch_storage::Error::EmailTaken) => StatusCode::CONFLICT,
            Self::Storage(ridematch_storage::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Storage(e) if e.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            Self::Auth(e) if e.is_client_error() => StatusCode::UNAUTHORIZED,
            Self::Storage(_) | Self::Auth(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Validation(_) => "Validation error".to_string(),
            Self::Storage(ridematch_storage::Error::EmailTaken) => {
                "Email already registered".to_string()
            }
            Self::Storage(ridematch_storage::Error::NotFound(_)) => "User not found".to_string(),
            Self::Storage(e) if e.is_unavailable() => "Database error".to_string(),
            Self::Auth(e) if e.is_client_error() => "Could not validate credentials".to_string(),
            Self::Storage(_) | Self::Auth(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m) => m.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            log::error!("Request failed: {self}");
        }

        let body = match &self {
            Self::Validation(errors) => json!({
                "detail": "Validation error",
                "errors": errors.errors(),
            }),
            _ => json!({ "detail": self.detail() }),
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                http::header::WWW_AUTHENTICATE,
                http::HeaderValue::from_static("Bearer"),
            );
        }
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            response.extensions_mut().insert(ErrorDetail(self.to_string()));
        }

        response
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation_field("body", rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        Self::validation_field("body", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        log::debug!("Path rejected: {}", rejection.body_text());
        Self::validation_field(
            "user_id",
            "Input should be a valid integer, unable to parse string as an integer",
        )
    }
}
