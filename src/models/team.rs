//! Team model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A member entry inside a team payload.
///
/// The team name is implied by the enclosing [`Team`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub is_active: bool,
}

/// A team and its members, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_name: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}
