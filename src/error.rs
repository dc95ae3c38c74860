// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::store::StoreError;

/// Global Application Error Enum.
/// Centralizes the engine's error taxonomy and its mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error (store failures, scoring anomalies)
    Internal(String),

    // 400 Bad Request (answer value does not fit the question)
    Validation(String),

    // 404 Not Found (unknown assessment/attempt/question, foreign attempt)
    NotFound(String),

    // 409 Conflict: state errors
    AssessmentNotOpen(String),
    MaxAttemptsReached,
    AttemptClosed,
    NotSubmitted,
    ResultNotReleased,

    // 410 Gone: autosave/submit raced the deadline and lost
    AttemptExpired,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON body with a stable machine-readable `code`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            AppError::AssessmentNotOpen(msg) => {
                (StatusCode::CONFLICT, "assessment_not_open", msg)
            }
            AppError::MaxAttemptsReached => (
                StatusCode::CONFLICT,
                "max_attempts_reached",
                "No attempts remaining".to_string(),
            ),
            AppError::AttemptClosed => (
                StatusCode::CONFLICT,
                "attempt_closed",
                "Attempt already submitted".to_string(),
            ),
            AppError::NotSubmitted => (
                StatusCode::CONFLICT,
                "not_submitted",
                "Attempt has not been submitted".to_string(),
            ),
            AppError::ResultNotReleased => (
                StatusCode::CONFLICT,
                "result_not_released",
                "Results have not been released".to_string(),
            ),
            AppError::AttemptExpired => (
                StatusCode::GONE,
                "attempt_expired",
                "Attempt deadline has passed".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

/// Converts `StoreError` into `AppError::Internal`.
/// Allows using `?` operator on store calls inside the engine.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}
