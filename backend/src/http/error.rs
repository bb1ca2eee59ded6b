//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::services::{ErrorCategory, SchedulingError, Violation};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Every offending row of a rejected batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            violations: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_violations(mut self, violations: Vec<Violation>) -> Self {
        self.violations = Some(violations);
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Engine error, mapped by category
    Scheduling(SchedulingError),
}

fn status_for(category: ErrorCategory) -> (StatusCode, &'static str) {
    match category {
        ErrorCategory::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorCategory::Prerequisite => (StatusCode::UNPROCESSABLE_ENTITY, "PREREQUISITE_NOT_MET"),
        ErrorCategory::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
        ErrorCategory::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorCategory::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Scheduling(e) => status_for(e.category()).0,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Scheduling(e) => {
                let (status, code) = status_for(e.category());
                if status.is_server_error() {
                    log::error!("Request failed: {}", e);
                }
                let mut body = ApiError::new(code, e.to_string());
                if e.is_retryable() {
                    body = body.with_details("re-fetch current state and retry");
                }
                if let SchedulingError::Rejected(violations) = e {
                    body = body.with_violations(violations);
                }
                (status, body)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        AppError::Scheduling(err)
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Scheduling(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamId;
    use crate::services::ViolationKind;

    #[test]
    fn test_categories_map_to_statuses() {
        let cases = [
            (SchedulingError::InvalidWindow("x".into()), StatusCode::BAD_REQUEST),
            (SchedulingError::Conflict("x".into()), StatusCode::CONFLICT),
            (SchedulingError::not_found("team", "T1"), StatusCode::NOT_FOUND),
            (
                SchedulingError::GuideSelectionOpen {
                    closes_at: chrono::Utc::now(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                SchedulingError::Repository(RepositoryError::connection("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_rejection_response_carries_violations() {
        let err = AppError::from(SchedulingError::Rejected(vec![Violation::new(
            TeamId::from("T3"),
            ViolationKind::DuplicateSlot,
            "taken",
        )]));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
