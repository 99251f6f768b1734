//! Database queries for users.

use crate::db::pool::DbPool;
use crate::db::DbError;
use crate::models::User;

/// Look up a single user by ID.
pub async fn get_user(pool: &DbPool, user_id: &str) -> Result<Option<User>, DbError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT user_id, username, team_name, is_active FROM users WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Get the active members of a team, in insertion order.
///
/// Returns an empty list when the team is unknown or has no active members.
pub async fn get_active_team_members(pool: &DbPool, team_name: &str) -> Result<Vec<User>, DbError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, username, team_name, is_active
        FROM users
        WHERE team_name = ? AND is_active = 1
        ORDER BY rowid
        "#,
    )
    .bind(team_name)
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Set a user's active flag.
///
/// # Returns
/// The updated user, or `None` if no such user exists
pub async fn set_is_active(
    pool: &DbPool,
    user_id: &str,
    is_active: bool,
) -> Result<Option<User>, DbError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET is_active = ?
        WHERE user_id = ?
        RETURNING user_id, username, team_name, is_active
        "#,
    )
    .bind(is_active)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
