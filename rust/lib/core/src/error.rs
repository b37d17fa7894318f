use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these —
// never on the human-readable message string.

/// Stable error code constants.
///
/// Clients should match on `code` from `{"code": "FORBIDDEN", "message": "..."}`.
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const INVALID_PARAMETER: &str = "INVALID_PARAMETER";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DATABASE_OPERATION: &str = "DATABASE_OPERATION";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. The JSON response always includes both:
///
/// ```json
/// {"code": "INVALID_PARAMETER", "message": "name is required"}
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Malformed/missing input, or a referenced entity that does not
    /// resolve. The message cites the parameter or entity name. HTTP 400.
    #[error("{0}")]
    Parameter(String),

    /// Missing or invalid authentication credentials. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to act on the target. HTTP 403.
    #[error("{0}")]
    Forbidden(String),

    /// Operation target does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Persistence-layer failure, wrapped so raw driver detail never
    /// reaches the caller. HTTP 500.
    #[error("database operation failed: {0}")]
    Database(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Parameter(_) => error_code::INVALID_PARAMETER,
            ServiceError::Unauthorized(_) => error_code::UNAUTHENTICATED,
            ServiceError::Forbidden(_) => error_code::FORBIDDEN,
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Database(_) => error_code::DATABASE_OPERATION,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Parameter(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Parameter error for a referenced entity that does not exist,
    /// citing the entity name.
    pub fn parameter_not_found(entity: &str) -> Self {
        ServiceError::Parameter(format!("{} not found", entity))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
