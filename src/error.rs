//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Missing, malformed, unknown or expired credentials
/// - **Authorization Errors**: Cross-organization access, email-gate denial
/// - **Resource Errors**: Requested resources not found
/// - **Configuration Errors**: Required secrets or environment values unset
/// - **Validation Errors**: Invalid request data
/// - **Upstream Errors**: Failures from the hosted LLM API
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// This wraps any sqlx::Error using the `#[from]` attribute, which
    /// automatically implements `From<sqlx::Error> for AppError`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request is not authenticated.
    ///
    /// Covers a missing or malformed Authorization header, an unknown or
    /// revoked key, an expired key, and a bad webhook signature.
    /// Returns HTTP 401 Unauthorized. The message is one of a fixed set of
    /// strings; unknown and revoked keys share one so callers cannot
    /// distinguish them.
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// Authenticated but not allowed to touch the resource.
    ///
    /// Returns HTTP 403 Forbidden. Used for cross-organization access and
    /// for email-gate denials, whose message is intentionally generic so
    /// probing users cannot learn the configured policy.
    #[error("{0}")]
    Forbidden(&'static str),

    /// Requested page does not exist, is unpublished (public routes), or
    /// belongs to a different organization in contexts where existence
    /// should not leak.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Page not found")]
    PageNotFound,

    /// Referenced prompt template does not exist or belongs to another
    /// organization.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Prompt not found")]
    PromptNotFound,

    /// Referenced API key does not exist or belongs to another organization.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("API key not found")]
    ApiKeyNotFound,

    /// A required secret or environment value is not configured.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("{0}")]
    ServerConfiguration(String),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// The hosted LLM API call failed.
    ///
    /// Returns HTTP 502 Bad Gateway. The generation record has already been
    /// marked failed by the time this surfaces.
    #[error("Content generation failed: {0}")]
    Generation(String),
}

impl AppError {
    /// True when the wrapped database error is a unique-constraint violation
    /// (PostgreSQL error code 23505).
    ///
    /// Used to turn duplicate page slugs into a 400 instead of a 500.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }
}

/// Convert AppError into an HTTP response.
///
/// This implementation allows Axum handlers to return `Result<T, AppError>`
/// and have errors automatically converted to proper HTTP responses.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::Unauthenticated(_) => {
                (StatusCode::UNAUTHORIZED, "unauthenticated", self.to_string())
            }
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::PageNotFound => (StatusCode::NOT_FOUND, "page_not_found", self.to_string()),
            AppError::PromptNotFound => {
                (StatusCode::NOT_FOUND, "prompt_not_found", self.to_string())
            }
            AppError::ApiKeyNotFound => {
                (StatusCode::NOT_FOUND, "api_key_not_found", self.to_string())
            }
            AppError::ServerConfiguration(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_configuration",
                msg.clone(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Generation(_) => (
                StatusCode::BAD_GATEWAY,
                "generation_failed",
                self.to_string(),
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
