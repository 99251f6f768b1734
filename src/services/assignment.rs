//! Reviewer assignment engine.
//!
//! Decides initial reviewers when a pull request is created, validates merge
//! and reassignment requests, and picks replacement reviewers. All reads go
//! through a [`Directory`] and a [`PullRequestStore`]; every operation ends in
//! at most one state-mutating store call.
//!
//! Missing and inactive users are both reported as `NotFound`, so callers
//! cannot tell the two apart.

use crate::db::{DbError, Directory, PullRequestStore};
use crate::error::{AppError, Resource};
use crate::models::{PullRequest, PullRequestStatus, User};
use crate::services::required;
use crate::services::selector::ReviewerSelector;
use chrono::{SubsecRound, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Number of reviewers assigned when a pull request is created.
pub const REVIEWERS_PER_PULL_REQUEST: usize = 2;

/// Result of a successful reassignment.
#[derive(Debug, Clone, Serialize)]
pub struct Reassignment {
    #[serde(rename = "pr")]
    pub pull_request: PullRequest,
    pub replaced_by: String,
}

/// The assignment engine.
pub struct AssignmentService {
    directory: Arc<dyn Directory>,
    store: Arc<dyn PullRequestStore>,
    selector: ReviewerSelector,
}

impl AssignmentService {
    pub fn new(
        directory: Arc<dyn Directory>,
        store: Arc<dyn PullRequestStore>,
        selector: ReviewerSelector,
    ) -> Self {
        Self {
            directory,
            store,
            selector,
        }
    }

    /// Create an open pull request and assign reviewers from the author's team.
    ///
    /// Up to [`REVIEWERS_PER_PULL_REQUEST`] active teammates (never the author)
    /// are chosen. A team with no other active member yields a PR without
    /// reviewers.
    ///
    /// # Errors
    /// * `InvalidInput` - a field is blank after trimming
    /// * `NotFound` - the author is unknown or inactive
    /// * `Exists` - a PR with this ID already exists
    pub async fn create(
        &self,
        pull_request_id: &str,
        pull_request_name: &str,
        author_id: &str,
    ) -> Result<PullRequest, AppError> {
        let pull_request_id = required(pull_request_id, "pull_request_id")?;
        let pull_request_name = required(pull_request_name, "pull_request_name")?;
        let author_id = required(author_id, "author_id")?;

        let author = self.active_user(author_id).await?;

        let candidates: Vec<User> = self
            .directory
            .get_active_team_members(&author.team_name)
            .await?
            .into_iter()
            .filter(|u| u.user_id != author.user_id)
            .collect();

        let reviewers = self.selector.pick(&candidates, REVIEWERS_PER_PULL_REQUEST);

        let pr = PullRequest {
            pull_request_id: pull_request_id.to_string(),
            pull_request_name: pull_request_name.to_string(),
            author_id: author.user_id,
            status: PullRequestStatus::Open,
            assigned_reviewers: reviewers,
            // Stored with second precision
            created_at: Utc::now().trunc_subsecs(0),
            merged_at: None,
        };

        self.store.create_pull_request(&pr).await.map_err(|e| match e {
            DbError::UniqueViolation { .. } => {
                AppError::exists_with_id(Resource::PullRequest, pull_request_id)
            }
            other => AppError::from(other),
        })?;

        log::info!(
            "[assignment] Created {} by {} with reviewers {:?}",
            pr.pull_request_id,
            pr.author_id,
            pr.assigned_reviewers
        );

        Ok(pr)
    }

    /// Merge a pull request. Merging an already-merged PR is a no-op.
    ///
    /// # Returns
    /// The PR as stored after the merge, carrying the first merge timestamp
    /// even if another merge raced this one.
    ///
    /// # Errors
    /// * `InvalidInput` - the ID is blank
    /// * `NotFound` - no such PR
    pub async fn merge(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        let pull_request_id = required(pull_request_id, "pull_request_id")?;

        let pr = self.existing_pull_request(pull_request_id).await?;
        if pr.is_merged() {
            log::debug!("[assignment] {} already merged", pull_request_id);
            return Ok(pr);
        }

        self.store
            .merge_pull_request(pull_request_id, Utc::now().trunc_subsecs(0))
            .await?;

        let merged = self.existing_pull_request(pull_request_id).await?;
        log::info!("[assignment] Merged {}", pull_request_id);

        Ok(merged)
    }

    /// Replace one reviewer of an open pull request with a random teammate.
    ///
    /// The replacement comes from the old reviewer's team and is never the
    /// old reviewer, the author, or anyone already reviewing this PR.
    ///
    /// # Errors
    /// * `InvalidInput` - a field is blank after trimming
    /// * `NotFound` - no such PR, or the old reviewer is unknown or inactive
    /// * `Merged` - the PR is merged
    /// * `NotAssigned` - the old reviewer does not review this PR
    /// * `NoCandidate` - nobody is eligible as a replacement
    pub async fn reassign(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> Result<Reassignment, AppError> {
        let pull_request_id = required(pull_request_id, "pull_request_id")?;
        let old_reviewer_id = required(old_reviewer_id, "old_user_id")?;

        let pr = self.existing_pull_request(pull_request_id).await?;

        if pr.is_merged() {
            log::debug!("[assignment] Refusing reassign on merged {}", pull_request_id);
            return Err(AppError::merged(pull_request_id));
        }

        if !pr.has_reviewer(old_reviewer_id) {
            return Err(AppError::not_assigned(pull_request_id, old_reviewer_id));
        }

        let old_reviewer = self.active_user(old_reviewer_id).await?;

        let mut excluded: HashSet<&str> =
            pr.assigned_reviewers.iter().map(String::as_str).collect();
        excluded.insert(pr.author_id.as_str());
        excluded.insert(old_reviewer.user_id.as_str());

        let candidates: Vec<User> = self
            .directory
            .get_active_team_members(&old_reviewer.team_name)
            .await?
            .into_iter()
            .filter(|u| !excluded.contains(u.user_id.as_str()))
            .collect();

        let Some(replacement) = self.selector.pick(&candidates, 1).into_iter().next() else {
            log::debug!("[assignment] No candidate to replace {} on {}", old_reviewer_id, pull_request_id);
            return Err(AppError::no_candidate(pull_request_id));
        };

        let replaced = self
            .store
            .replace_reviewer(pull_request_id, old_reviewer_id, &replacement)
            .await?;
        if !replaced {
            log::debug!(
                "[assignment] {} was unassigned from {} by a concurrent request",
                old_reviewer_id,
                pull_request_id
            );
            return Err(AppError::not_assigned(pull_request_id, old_reviewer_id));
        }

        let updated = self.existing_pull_request(pull_request_id).await?;
        log::info!(
            "[assignment] Replaced {} with {} on {}",
            old_reviewer_id,
            replacement,
            pull_request_id
        );

        Ok(Reassignment {
            pull_request: updated,
            replaced_by: replacement,
        })
    }

    async fn existing_pull_request(&self, pull_request_id: &str) -> Result<PullRequest, AppError> {
        self.store
            .get_pull_request(pull_request_id)
            .await?
            .ok_or_else(|| AppError::not_found_with_id(Resource::PullRequest, pull_request_id))
    }

    /// Resolve a user that must exist and be active.
    async fn active_user(&self, user_id: &str) -> Result<User, AppError> {
        match self.directory.get_user(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AppError::not_found_with_id(Resource::User, user_id)),
        }
    }
}
