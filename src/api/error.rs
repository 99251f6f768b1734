//! Mapping from [`AppError`] to HTTP responses.
//!
//! This is the only place that knows about status codes. Error bodies have
//! the shape `{"error": {"code": "...", "message": "..."}}`.

use crate::error::{AppError, Resource};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Status code and machine-readable code for every error variant.
pub fn status_and_code(err: &AppError) -> (StatusCode, &'static str) {
    match err {
        AppError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        AppError::Exists {
            resource: Resource::PullRequest,
            ..
        } => (StatusCode::CONFLICT, "PR_EXISTS"),
        AppError::Exists {
            resource: Resource::Team,
            ..
        } => (StatusCode::BAD_REQUEST, "TEAM_EXISTS"),
        AppError::Exists {
            resource: Resource::User,
            ..
        } => (StatusCode::BAD_REQUEST, "MEMBER_EXISTS"),
        AppError::Merged { .. } => (StatusCode::CONFLICT, "PR_MERGED"),
        AppError::NotAssigned { .. } => (StatusCode::CONFLICT, "NOT_ASSIGNED"),
        AppError::NoCandidate { .. } => (StatusCode::CONFLICT, "NO_CANDIDATE"),
        AppError::Database { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

/// Wrapper to make AppError usable as an axum error response.
#[derive(Debug)]
pub struct ApiErr(pub AppError);

impl IntoResponse for ApiErr {
    fn into_response(self) -> Response {
        let (status, code) = status_and_code(&self.0);

        // Opaque failures are logged here and never echoed to the client
        let message = if self.0.is_opaque() {
            log::error!("[api] {}", self.0);
            "internal error".to_string()
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(ErrorEnvelope {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}

impl From<AppError> for ApiErr {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiErr {
    fn from(rejection: JsonRejection) -> Self {
        Self(AppError::invalid_input(format!(
            "invalid json: {}",
            rejection.body_text()
        )))
    }
}
