//! In-memory implementation of [`Directory`] and [`PullRequestStore`].
//!
//! All state is held in memory and lost on drop. Used by engine tests to seed
//! exact directory states without a database file; `set_unavailable` makes
//! every call fail so error propagation can be observed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::store::{Directory, PullRequestStore};
use super::DbError;
use crate::error::Resource;
use crate::models::{PullRequest, PullRequestStatus, User};

/// In-memory directory and PR store.
pub struct InMemoryStore {
    /// Users in insertion order.
    users: RwLock<Vec<User>>,
    pull_requests: RwLock<HashMap<String, PullRequest>>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            pull_requests: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Add or replace a user.
    pub async fn put_user(&self, user: User) {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.user_id == user.user_id) {
            Some(existing) => *existing = user,
            None => users.push(user),
        }
    }

    /// Insert a PR as-is, bypassing uniqueness checks.
    pub async fn put_pull_request(&self, pr: PullRequest) {
        let mut prs = self.pull_requests.write().await;
        prs.insert(pr.pull_request_id.clone(), pr);
    }

    /// Make every subsequent call fail with a pool error (or recover).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DbError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::Sqlite(sqlx::Error::PoolClosed));
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Directory for InMemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DbError> {
        self.check_available()?;
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn get_active_team_members(&self, team_name: &str) -> Result<Vec<User>, DbError> {
        self.check_available()?;
        let users = self.users.read().await;
        Ok(users
            .iter()
            .filter(|u| u.team_name == team_name && u.is_active)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PullRequestStore for InMemoryStore {
    async fn create_pull_request(&self, pr: &PullRequest) -> Result<(), DbError> {
        self.check_available()?;
        let mut prs = self.pull_requests.write().await;
        if prs.contains_key(&pr.pull_request_id) {
            return Err(DbError::UniqueViolation {
                resource: Resource::PullRequest,
            });
        }
        prs.insert(pr.pull_request_id.clone(), pr.clone());
        Ok(())
    }

    async fn get_pull_request(&self, pull_request_id: &str) -> Result<Option<PullRequest>, DbError> {
        self.check_available()?;
        let prs = self.pull_requests.read().await;
        Ok(prs.get(pull_request_id).cloned())
    }

    async fn merge_pull_request(
        &self,
        pull_request_id: &str,
        merged_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        self.check_available()?;
        let mut prs = self.pull_requests.write().await;
        if let Some(pr) = prs.get_mut(pull_request_id) {
            pr.status = PullRequestStatus::Merged;
            pr.merged_at.get_or_insert(merged_at);
        }
        Ok(())
    }

    async fn replace_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
        new_reviewer_id: &str,
    ) -> Result<bool, DbError> {
        self.check_available()?;
        let mut prs = self.pull_requests.write().await;
        let Some(pr) = prs.get_mut(pull_request_id) else {
            return Ok(false);
        };
        let Some(pos) = pr.assigned_reviewers.iter().position(|r| r == old_reviewer_id) else {
            return Ok(false);
        };
        pr.assigned_reviewers.remove(pos);
        pr.assigned_reviewers.push(new_reviewer_id.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_active_members_keep_insertion_order() {
        let store = InMemoryStore::new();
        store.put_user(User::new("c", "Carol", "team", true)).await;
        store.put_user(User::new("a", "Alice", "team", true)).await;
        store.put_user(User::new("x", "Xavier", "other", true)).await;
        store.put_user(User::new("b", "Bob", "team", false)).await;

        let members = store.get_active_team_members("team").await.unwrap();
        let ids: Vec<&str> = members.iter().map(|u| u.user_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
        assert!(store.get_active_team_members("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_put_user_replaces_existing() {
        let store = InMemoryStore::new();
        store.put_user(User::new("a", "Alice", "team", true)).await;
        store.put_user(User::new("a", "Alice", "team", false)).await;

        let user = store.get_user("a").await.unwrap().unwrap();
        assert!(!user.is_active);
        assert_eq!(store.users.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_replace_missing_reviewer_is_noop() {
        let store = InMemoryStore::new();
        store
            .put_pull_request(PullRequest {
                pull_request_id: "pr1".into(),
                pull_request_name: "Test".into(),
                author_id: "a".into(),
                status: PullRequestStatus::Open,
                assigned_reviewers: vec!["b".into(), "c".into()],
                created_at: Utc::now(),
                merged_at: None,
            })
            .await;

        assert!(store.replace_reviewer("pr1", "b", "d").await.unwrap());
        assert!(!store.replace_reviewer("pr1", "b", "e").await.unwrap());
        assert!(!store.replace_reviewer("missing", "b", "e").await.unwrap());

        let pr = store.get_pull_request("pr1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["c", "d"]);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.get_user("a").await,
            Err(DbError::Sqlite(sqlx::Error::PoolClosed))
        ));

        store.set_unavailable(false);
        assert!(store.get_user("a").await.unwrap().is_none());
    }
}
