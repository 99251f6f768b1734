//! Application error types.
//!
//! `AppError` is the closed set of outcomes a caller can receive from the
//! assignment engine and the directory services. The business-rule variants
//! (`InvalidInput` through `NoCandidate`) are expected, caller-recoverable
//! conditions; `Database` is the opaque failure.
//!
//! Mapping these variants to HTTP status codes happens at the API boundary
//! (see `api::error`), never here.

use serde::Serialize;
use thiserror::Error;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Resource {
    PullRequest,
    Team,
    User,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PullRequest => write!(f, "PullRequest"),
            Self::Team => write!(f, "Team"),
            Self::User => write!(f, "User"),
        }
    }
}

/// Application-level errors.
///
/// All variants serialize to a structured JSON object.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    /// A required field was empty or blank after trimming.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Requested record not found. Inactive users are reported here too.
    #[error("Not found: {resource}")]
    NotFound {
        resource: Resource,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// A record with the same unique key already exists.
    #[error("Already exists: {resource}")]
    Exists {
        resource: Resource,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },

    /// Reassignment attempted on a merged pull request.
    #[error("Pull request {pull_request_id} is already merged")]
    Merged { pull_request_id: String },

    /// The reviewer to replace is not assigned to the pull request.
    #[error("Reviewer {reviewer_id} is not assigned to pull request {pull_request_id}")]
    NotAssigned {
        pull_request_id: String,
        reviewer_id: String,
    },

    /// No active teammate is eligible as a replacement reviewer.
    #[error("No replacement candidate for pull request {pull_request_id}")]
    NoCandidate { pull_request_id: String },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database { message: String },
}

impl AppError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a not found error with ID.
    pub fn not_found_with_id(resource: Resource, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: Some(id.into()),
        }
    }

    /// Create an already-exists error with ID.
    pub fn exists_with_id(resource: Resource, id: impl Into<String>) -> Self {
        Self::Exists {
            resource,
            id: Some(id.into()),
        }
    }

    pub fn merged(pull_request_id: impl Into<String>) -> Self {
        Self::Merged {
            pull_request_id: pull_request_id.into(),
        }
    }

    pub fn not_assigned(pull_request_id: impl Into<String>, reviewer_id: impl Into<String>) -> Self {
        Self::NotAssigned {
            pull_request_id: pull_request_id.into(),
            reviewer_id: reviewer_id.into(),
        }
    }

    pub fn no_candidate(pull_request_id: impl Into<String>) -> Self {
        Self::NoCandidate {
            pull_request_id: pull_request_id.into(),
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Whether this is an opaque failure rather than a business-rule outcome.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Database { .. })
    }
}

// Conversions from lower-level error types

impl From<crate::db::DbError> for AppError {
    fn from(err: crate::db::DbError) -> Self {
        match err {
            crate::db::DbError::UniqueViolation { resource } => Self::Exists { resource, id: None },
            other => Self::database(other.to_string()),
        }
    }
}
