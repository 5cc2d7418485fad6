use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    // Request errors
    BadRequest(String),
    QuotaExceeded { remaining: i64 },

    // Usage store errors
    UsageTrackingFailure(String),
    RedisError(String),

    // External service errors
    UpstreamTranslationFailure(String),
    TranslationNotConfigured,

    // Internal errors
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::QuotaExceeded { remaining } => write!(
                f,
                "Translation limit reached for this month ({} characters remaining)",
                remaining
            ),
            Self::UsageTrackingFailure(msg) => write!(f, "Failed to track API usage: {}", msg),
            Self::RedisError(msg) => write!(f, "Redis error: {}", msg),
            Self::UpstreamTranslationFailure(msg) => write!(f, "Translation failed: {}", msg),
            Self::TranslationNotConfigured => write!(f, "Translation service is not configured"),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "bad_request"),
            Self::QuotaExceeded { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "Translation limit reached for this month".to_string(),
                "quota_exceeded",
            ),
            // Storage details stay in the logs
            Self::UsageTrackingFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to track API usage".to_string(),
                "usage_tracking_failure",
            ),
            Self::RedisError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                "redis_error",
            ),
            Self::UpstreamTranslationFailure(msg) => (
                StatusCode::BAD_GATEWAY,
                msg.clone(),
                "upstream_translation_failure",
            ),
            Self::TranslationNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Translation service is not configured".to_string(),
                "translation_not_configured",
            ),
            Self::InternalError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                "internal_error",
            ),
        };

        let mut body = json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "status": status.as_u16(),
            }
        });

        if let Self::QuotaExceeded { remaining } = self {
            body["remaining"] = json!(remaining);
        }

        (status, Json(body)).into_response()
    }
}

// Reading a provider response body surfaces as an upstream failure
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::UpstreamTranslationFailure(err.to_string())
    }
}

/// Result type alias for application errors
pub type Result<T> = std::result::Result<T, AppError>;
