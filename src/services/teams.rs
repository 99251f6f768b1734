//! Team directory service.

use crate::db::pool::DbPool;
use crate::db::{teams, DbError};
use crate::error::{AppError, Resource};
use crate::models::{Team, TeamMember};
use crate::services::required;
use std::collections::HashSet;

/// Create a team together with its members.
///
/// # Errors
/// * `InvalidInput` - blank team name, blank member field, or a member ID
///   repeated within the request
/// * `Exists` - the team name is taken (`Team`) or a member ID already
///   belongs to some team (`User`)
pub async fn create_team(pool: &DbPool, team: Team) -> Result<Team, AppError> {
    let team = normalize(team)?;

    teams::insert_team(pool, &team).await.map_err(|e| match e {
        DbError::UniqueViolation {
            resource: Resource::Team,
        } => AppError::exists_with_id(Resource::Team, team.team_name.as_str()),
        other => AppError::from(other),
    })?;

    log::info!(
        "[teams] Created team {} with {} members",
        team.team_name,
        team.members.len()
    );

    Ok(team)
}

/// Get a team and all of its members.
pub async fn get_team(pool: &DbPool, team_name: &str) -> Result<Team, AppError> {
    let team_name = required(team_name, "team_name")?;

    teams::get_team(pool, team_name)
        .await?
        .ok_or_else(|| AppError::not_found_with_id(Resource::Team, team_name))
}

/// Trim every field and reject blank or repeated member IDs.
fn normalize(team: Team) -> Result<Team, AppError> {
    let team_name = required(&team.team_name, "team_name")?.to_string();

    let mut seen = HashSet::new();
    let mut members = Vec::with_capacity(team.members.len());
    for member in &team.members {
        let user_id = required(&member.user_id, "user_id")?;
        let username = required(&member.username, "username")?;
        if !seen.insert(user_id.to_string()) {
            return Err(AppError::invalid_input_field(
                format!("duplicate member {}", user_id),
                "members",
            ));
        }
        members.push(TeamMember {
            user_id: user_id.to_string(),
            username: username.to_string(),
            is_active: member.is_active,
        });
    }

    Ok(Team { team_name, members })
}
