//! Database queries for pull requests and their reviewer rows.
//!
//! Create and reviewer replacement each run in a single transaction: the
//! `pull_requests` row and its `pr_reviewers` rows are never observable in a
//! half-written state. Dropping one of these futures mid-flight drops the
//! open transaction, which rolls it back.

use crate::db::pool::DbPool;
use crate::db::DbError;
use crate::error::Resource;
use crate::models::{PullRequest, PullRequestShort, PullRequestStatus, ReviewerStat};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Raw `pull_requests` row, before reviewers are attached.
#[derive(Debug, FromRow)]
struct PullRequestRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
    created_at: i64,
    merged_at: Option<i64>,
}

impl PullRequestRow {
    fn into_model(self, assigned_reviewers: Vec<String>) -> PullRequest {
        PullRequest {
            pull_request_id: self.pull_request_id,
            pull_request_name: self.pull_request_name,
            author_id: self.author_id,
            status: PullRequestStatus::from(self.status.as_str()),
            assigned_reviewers,
            created_at: from_unix(self.created_at),
            merged_at: self.merged_at.map(from_unix),
        }
    }
}

#[derive(Debug, FromRow)]
struct PullRequestShortRow {
    pull_request_id: String,
    pull_request_name: String,
    author_id: String,
    status: String,
}

impl From<PullRequestShortRow> for PullRequestShort {
    fn from(row: PullRequestShortRow) -> Self {
        Self {
            pull_request_id: row.pull_request_id,
            pull_request_name: row.pull_request_name,
            author_id: row.author_id,
            status: PullRequestStatus::from(row.status.as_str()),
        }
    }
}

fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Insert a pull request and its initial reviewers atomically.
///
/// A duplicate `pull_request_id` yields [`DbError::UniqueViolation`] and
/// leaves the existing record untouched.
pub async fn insert_pull_request(pool: &DbPool, pr: &PullRequest) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status, created_at, merged_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&pr.pull_request_id)
    .bind(&pr.pull_request_name)
    .bind(&pr.author_id)
    .bind(pr.status.to_string())
    .bind(pr.created_at.timestamp())
    .bind(pr.merged_at.map(|t| t.timestamp()))
    .execute(&mut *tx)
    .await
    .map_err(|e| DbError::on_insert(e, Resource::PullRequest))?;

    for reviewer_id in &pr.assigned_reviewers {
        sqlx::query("INSERT INTO pr_reviewers (pull_request_id, reviewer_id) VALUES (?, ?)")
            .bind(&pr.pull_request_id)
            .bind(reviewer_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(())
}

/// Get a pull request together with its current reviewers.
pub async fn get_pull_request(pool: &DbPool, pull_request_id: &str) -> Result<Option<PullRequest>, DbError> {
    let row = sqlx::query_as::<_, PullRequestRow>(
        r#"
        SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
        FROM pull_requests
        WHERE pull_request_id = ?
        "#,
    )
    .bind(pull_request_id)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let reviewers: Vec<(String,)> = sqlx::query_as(
        "SELECT reviewer_id FROM pr_reviewers WHERE pull_request_id = ? ORDER BY rowid",
    )
    .bind(pull_request_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(row.into_model(
        reviewers.into_iter().map(|(id,)| id).collect(),
    )))
}

/// Mark a pull request as merged.
///
/// `merged_at` is only written when it is still unset, so a second
/// concurrent merge keeps the first timestamp.
pub async fn merge_pull_request(
    pool: &DbPool,
    pull_request_id: &str,
    merged_at: DateTime<Utc>,
) -> Result<(), DbError> {
    sqlx::query(
        r#"
        UPDATE pull_requests
        SET status = 'MERGED', merged_at = COALESCE(merged_at, ?)
        WHERE pull_request_id = ?
        "#,
    )
    .bind(merged_at.timestamp())
    .bind(pull_request_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Swap one reviewer for another in a single transaction.
///
/// # Returns
/// `false` without changing anything if `old_reviewer_id` was no longer
/// assigned when the transaction ran (a concurrent reassign got there first).
pub async fn replace_reviewer(
    pool: &DbPool,
    pull_request_id: &str,
    old_reviewer_id: &str,
    new_reviewer_id: &str,
) -> Result<bool, DbError> {
    let mut tx = pool.begin().await?;

    let removed = sqlx::query("DELETE FROM pr_reviewers WHERE pull_request_id = ? AND reviewer_id = ?")
        .bind(pull_request_id)
        .bind(old_reviewer_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if removed == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("INSERT INTO pr_reviewers (pull_request_id, reviewer_id) VALUES (?, ?)")
        .bind(pull_request_id)
        .bind(new_reviewer_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(true)
}

/// List the pull requests a user currently reviews.
pub async fn get_reviews_for_user(pool: &DbPool, user_id: &str) -> Result<Vec<PullRequestShort>, DbError> {
    let rows = sqlx::query_as::<_, PullRequestShortRow>(
        r#"
        SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status
        FROM pr_reviewers r
        JOIN pull_requests pr ON pr.pull_request_id = r.pull_request_id
        WHERE r.reviewer_id = ?
        ORDER BY pr.created_at, pr.pull_request_id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PullRequestShort::from).collect())
}

/// Count current reviewer assignments per user.
pub async fn assignment_stats(pool: &DbPool) -> Result<Vec<ReviewerStat>, DbError> {
    let stats = sqlx::query_as::<_, ReviewerStat>(
        r#"
        SELECT reviewer_id AS user_id, COUNT(*) AS count
        FROM pr_reviewers
        GROUP BY reviewer_id
        ORDER BY count DESC, reviewer_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(stats)
}
