// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::{error, warn};

use crate::auth::oauth::OAuthError;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
    ValidationError(String),
    MalformedState(String),
    CsrfMismatch(String),
    AuthenticationFailed(String),
    ProviderDenied(String),
    UnverifiedEmail(String),
    Upstream(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::MalformedState(msg) => write!(f, "Malformed State: {}", msg),
            ApiError::CsrfMismatch(msg) => write!(f, "CSRF Mismatch: {}", msg),
            ApiError::AuthenticationFailed(msg) => write!(f, "Authentication Failed: {}", msg),
            ApiError::ProviderDenied(msg) => write!(f, "Provider Denied: {}", msg),
            ApiError::UnverifiedEmail(msg) => write!(f, "Unverified Email: {}", msg),
            ApiError::Upstream(msg) => write!(f, "Upstream Error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_message, code) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, "UNAUTHORIZED"),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            ApiError::InternalServer(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg,
                "INTERNAL_SERVER_ERROR",
            ),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, "VALIDATION_ERROR"),
            ApiError::MalformedState(msg) => (StatusCode::BAD_REQUEST, msg, "MALFORMED_STATE"),
            ApiError::CsrfMismatch(msg) => (StatusCode::FORBIDDEN, msg, "CSRF_MISMATCH"),
            ApiError::AuthenticationFailed(msg) => {
                (StatusCode::UNAUTHORIZED, msg, "TOKEN_EXCHANGE_FAILED")
            }
            ApiError::ProviderDenied(msg) => (StatusCode::UNAUTHORIZED, msg, "PROVIDER_DENIED"),
            ApiError::UnverifiedEmail(msg) => (StatusCode::FORBIDDEN, msg, "EMAIL_NOT_VERIFIED"),
            ApiError::Upstream(msg) => {
                warn!(error = %msg, "Identity provider call failed");
                (StatusCode::BAD_GATEWAY, msg, "UPSTREAM_ERROR")
            }
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::MalformedState => ApiError::MalformedState(err.to_string()),
            OAuthError::CsrfMismatch => ApiError::CsrfMismatch(err.to_string()),
            OAuthError::TokenExchangeFailed { .. } => {
                ApiError::AuthenticationFailed(err.to_string())
            }
            OAuthError::ProviderDenied(_) => ApiError::ProviderDenied(err.to_string()),
            OAuthError::UnverifiedEmail => ApiError::UnverifiedEmail(err.to_string()),
            OAuthError::NotConfigured => ApiError::InternalServer(err.to_string()),
            OAuthError::Upstream(_) => ApiError::Upstream(err.to_string()),
            OAuthError::Storage(e) => ApiError::DatabaseError(e),
            OAuthError::TokenIssue(msg) => ApiError::InternalServer(msg),
        }
    }
}
