//! Data models for the application.
//!
//! These models represent the core entities stored in the local SQLite database
//! and exchanged with HTTP clients.
//!
//! Row-shaped models derive FromRow for SQLx queries; all models derive Serialize.

pub mod pull_request;
pub mod team;
pub mod user;

// Re-exports for convenient access
pub use pull_request::{PullRequest, PullRequestShort, PullRequestStatus, ReviewerStat};
pub use team::{Team, TeamMember};
pub use user::User;
