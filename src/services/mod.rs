//! Business logic services.
//!
//! This module contains the reviewer assignment engine and the directory
//! services for teams and users.
//!
//! Services are independent of the HTTP layer and return [`AppError`].

pub mod assignment;
pub mod selector;
pub mod teams;
pub mod users;

pub use assignment::{AssignmentService, Reassignment};
pub use selector::ReviewerSelector;

use crate::error::AppError;

/// Trim a required field, rejecting it if nothing is left.
pub(crate) fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input_field(
            format!("{} is required", field),
            field,
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("  pr-1\n", "pull_request_id").unwrap(), "pr-1");
    }

    #[test]
    fn test_required_rejects_blank() {
        let err = required(" \t ", "author_id").unwrap_err();
        match err {
            AppError::InvalidInput { field, .. } => assert_eq!(field.as_deref(), Some("author_id")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
