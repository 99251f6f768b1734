//! Database queries for teams.

use crate::db::pool::DbPool;
use crate::db::DbError;
use crate::error::Resource;
use crate::models::{Team, TeamMember};

/// Insert a team and all of its members in one transaction.
///
/// A duplicate team name is reported as a `Team` unique violation; a member
/// ID that already belongs to any team is reported as a `User` one. Either
/// way nothing is written.
pub async fn insert_team(pool: &DbPool, team: &Team) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO teams (team_name) VALUES (?)")
        .bind(&team.team_name)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::on_insert(e, Resource::Team))?;

    for member in &team.members {
        sqlx::query(
            "INSERT INTO users (user_id, username, team_name, is_active) VALUES (?, ?, ?, ?)",
        )
        .bind(&member.user_id)
        .bind(&member.username)
        .bind(&team.team_name)
        .bind(member.is_active)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::on_insert(e, Resource::User))?;
    }

    tx.commit().await?;

    Ok(())
}

/// Get a team with all members (active or not), in insertion order.
pub async fn get_team(pool: &DbPool, team_name: &str) -> Result<Option<Team>, DbError> {
    let exists: Option<(String,)> = sqlx::query_as("SELECT team_name FROM teams WHERE team_name = ?")
        .bind(team_name)
        .fetch_optional(pool)
        .await?;

    let Some((team_name,)) = exists else {
        return Ok(None);
    };

    let members = sqlx::query_as::<_, TeamMember>(
        r#"
        SELECT user_id, username, is_active
        FROM users
        WHERE team_name = ?
        ORDER BY rowid
        "#,
    )
    .bind(&team_name)
    .fetch_all(pool)
    .await?;

    Ok(Some(Team { team_name, members }))
}
