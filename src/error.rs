//! API Error Taxonomy
//! Mission: Map every failure to a stable status code and JSON body

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors surfaced to API clients.
///
/// Missing credentials fail with 403 while invalid credentials fail with 401.
/// That split is part of the public contract and must not be collapsed.
#[derive(Debug)]
pub enum ApiError {
    /// 400 - missing or malformed required fields
    InvalidInput(String),
    /// 403 - no Authorization header / not bearer scheme
    MissingToken,
    /// 401 - token invalid, expired, or subject no longer exists
    NotAuthorized(String),
    /// 403 - authenticated but not the resource owner
    Forbidden(String),
    /// 404 - unknown resource id
    NotFound(String),
    /// 409 - duplicate value for a unique field
    Conflict(String),
    /// 500 - unexpected storage/runtime failure
    Internal(anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ApiError::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ApiError::Forbidden(msg.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        // Unique-constraint violations are a client-visible Conflict, not a
        // generic storage failure.
        if let rusqlite::Error::SqliteFailure(e, _) = &err {
            if e.code == rusqlite::ErrorCode::ConstraintViolation {
                return ApiError::Conflict("Duplicate value for a unique field".to_string());
            }
        }
        ApiError::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            ApiError::MissingToken => (
                StatusCode::FORBIDDEN,
                json!({ "message": "Access denied: no token provided" }),
            ),
            ApiError::NotAuthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "message": msg })),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "message": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "message": msg })),
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "message": "Server error", "error": err.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
