use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers. Clients match on these,
// never on the human-readable message string.

/// Stable error code constants.
///
/// Clients should match on `code` from `{"code": "NOT_FOUND", "message": "..."}`.
/// Codes never change; messages may be reworded.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VERSION_CONFLICT: &str = "VERSION_CONFLICT";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const INTERNAL: &str = "INTERNAL";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";

    // Patch failures. The codes are produced by the patch engine.
    pub const PATH_NOT_FOUND: &str = "PATH_NOT_FOUND";
    pub const INDEX_OUT_OF_BOUNDS: &str = "INDEX_OUT_OF_BOUNDS";
    pub const INVALID_INDEX: &str = "INVALID_INDEX";
    pub const ASSERTION_FAILED: &str = "ASSERTION_FAILED";
    pub const STRUCTURAL_CONFLICT: &str = "STRUCTURAL_CONFLICT";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Unified service error type used across all modules.
///
/// Each variant maps to a stable error code (see [`error_code`]) and an
/// HTTP status code. The JSON response always includes both:
///
/// ```json
/// {"code": "NOT_FOUND", "message": "organization 'abc' not found"}
/// ```
///
/// Patch failures also carry the failing operation's `index` and `path`.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate key / resource already exists. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// The stored record changed since it was read. HTTP 409.
    #[error("{0}")]
    Stale(String),

    /// Input data is invalid. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid authentication credentials. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),

    /// A patch sequence is malformed. HTTP 400. `index` is the first
    /// offending operation, absent when the body is not an array.
    #[error("{message}")]
    InvalidPatch { index: Option<usize>, message: String },

    /// A patch operation could not be applied. HTTP 422, or 412 for a failed `test`.
    #[error("{message}")]
    Patch {
        code: &'static str,
        index: usize,
        path: String,
        message: String,
    },

    /// Storage backend failure. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Unexpected internal error. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Stable, machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => error_code::NOT_FOUND,
            ServiceError::Conflict(_) => error_code::ALREADY_EXISTS,
            ServiceError::Stale(_) => error_code::VERSION_CONFLICT,
            ServiceError::Validation(_) | ServiceError::InvalidPatch { .. } => {
                error_code::VALIDATION_FAILED
            }
            ServiceError::Unauthorized(_) => error_code::UNAUTHENTICATED,
            ServiceError::Patch { code, .. } => code,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Stale(_) => StatusCode::CONFLICT,
            ServiceError::Validation(_) | ServiceError::InvalidPatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Patch { code, .. } if *code == error_code::ASSERTION_FAILED => {
                StatusCode::PRECONDITION_FAILED
            }
            ServiceError::Patch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A request body that is not JSON, or does not fit the expected shape.
impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        ServiceError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        match &self {
            ServiceError::Patch { index, path, .. } => {
                body["index"] = serde_json::json!(index);
                body["path"] = serde_json::json!(path);
            }
            ServiceError::InvalidPatch { index: Some(index), .. } => {
                body["index"] = serde_json::json!(index);
            }
            _ => {}
        }
        (status, axum::Json(body)).into_response()
    }
}
