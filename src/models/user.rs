//! User model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A team member as known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub user_id: String,

    /// Display name.
    pub username: String,

    /// Name of the team the user belongs to.
    pub team_name: String,

    /// Inactive users are never picked as reviewers and cannot author PRs.
    pub is_active: bool,
}

impl User {
    /// Build a user, mostly useful for seeding stores in tests.
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        team_name: impl Into<String>,
        is_active: bool,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            team_name: team_name.into(),
            is_active,
        }
    }
}
