//! Collaborator traits consumed by the assignment engine.
//!
//! The engine only ever talks to a [`Directory`] (who exists, who is active,
//! who is on which team) and a [`PullRequestStore`] (durable PR records).
//! Both are async traits so the engine stays ignorant of the storage
//! technology; [`SqliteStore`] implements them on top of the pool and
//! [`super::InMemoryStore`] implements them for tests.

use crate::db::pool::DbPool;
use crate::db::{pull_requests, users, DbError};
use crate::models::{PullRequest, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// User and team lookups.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Get a user by ID, or `None` if unknown.
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError>;

    /// Get all active members of a team. Never fails for an unknown team;
    /// the list is simply empty.
    async fn get_active_team_members(&self, team_name: &str) -> Result<Vec<User>, DbError>;
}

/// Durable pull request records.
#[async_trait]
pub trait PullRequestStore: Send + Sync {
    /// Insert the PR and its reviewers as one unit.
    ///
    /// Must report a duplicate ID as [`DbError::UniqueViolation`].
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), DbError>;

    /// Get a PR with its current reviewers, or `None` if unknown.
    async fn get_pull_request(&self, pull_request_id: &str) -> Result<Option<PullRequest>, DbError>;

    /// Set status to merged; `merged_at` is only written if still unset.
    async fn merge_pull_request(
        &self,
        pull_request_id: &str,
        merged_at: DateTime<Utc>,
    ) -> Result<(), DbError>;

    /// Remove `old_reviewer_id` and add `new_reviewer_id` as one unit.
    ///
    /// Returns `false` and changes nothing if `old_reviewer_id` is not
    /// assigned at the time of the write.
    async fn replace_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<bool, DbError>;
}

/// SQLite-backed directory and PR store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for SqliteStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError> {
        users::get_user(&self.pool, user_id).await
    }

    async fn get_active_team_members(&self, team_name: &str) -> Result<Vec<User>, DbError> {
        users::get_active_team_members(&self.pool, team_name).await
    }
}

#[async_trait]
impl PullRequestStore for SqliteStore {
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), DbError> {
        pull_requests::insert_pull_request(&self.pool, pr).await
    }

    async fn get_pull_request(&self, pull_request_id: &str) -> Result<Option<PullRequest>, DbError> {
        pull_requests::get_pull_request(&self.pool, pull_request_id).await
    }

    async fn merge_pull_request(
        &self,
        pull_request_id: &str,
        merged_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        pull_requests::merge_pull_request(&self.pool, pull_request_id, merged_at).await
    }

    async fn replace_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<bool, DbError> {
        pull_requests::replace_reviewer(&self.pool, pull_request_id, old_reviewer_id, new_reviewer_id)
            .await
    }
}
