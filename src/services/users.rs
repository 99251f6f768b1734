//! User directory service: activation and review workload.

use crate::db::pool::DbPool;
use crate::db::{pull_requests, users};
use crate::error::{AppError, Resource};
use crate::models::{PullRequestShort, ReviewerStat, User};
use crate::services::required;

/// Activate or deactivate a user.
///
/// Deactivated users keep their existing reviews but are no longer picked.
pub async fn set_is_active(pool: &DbPool, user_id: &str, is_active: bool) -> Result<User, AppError> {
    let user_id = required(user_id, "user_id")?;

    let user = users::set_is_active(pool, user_id, is_active)
        .await?
        .ok_or_else(|| AppError::not_found_with_id(Resource::User, user_id))?;

    log::info!("[users] {} is_active={}", user.user_id, user.is_active);

    Ok(user)
}

/// List the pull requests a user currently reviews.
pub async fn get_review(pool: &DbPool, user_id: &str) -> Result<Vec<PullRequestShort>, AppError> {
    let user_id = required(user_id, "user_id")?;

    if users::get_user(pool, user_id).await?.is_none() {
        return Err(AppError::not_found_with_id(Resource::User, user_id));
    }

    Ok(pull_requests::get_reviews_for_user(pool, user_id).await?)
}

/// Current assignment count per reviewer, busiest first.
pub async fn reviewer_stats(pool: &DbPool) -> Result<Vec<ReviewerStat>, AppError> {
    Ok(pull_requests::assignment_stats(pool).await?)
}
