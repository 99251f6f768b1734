//! Pull request routes: create, merge, reassign.

use crate::api::error::ApiErr;
use crate::api::AppState;
use crate::models::PullRequest;
use crate::services::Reassignment;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct CreateRequest {
    #[serde(default)]
    pull_request_id: String,
    #[serde(default)]
    pull_request_name: String,
    #[serde(default)]
    author_id: String,
}

#[derive(Deserialize)]
struct MergeRequest {
    #[serde(default)]
    pull_request_id: String,
}

#[derive(Deserialize)]
struct ReassignRequest {
    #[serde(default)]
    pull_request_id: String,
    #[serde(default)]
    old_user_id: String,
}

#[derive(Serialize)]
struct PullRequestEnvelope {
    pr: PullRequest,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pullRequest/create", post(create))
        .route("/pullRequest/merge", post(merge))
        .route("/pullRequest/reassign", post(reassign))
}

/// POST /pullRequest/create
async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PullRequestEnvelope>), ApiErr> {
    let Json(req) = body?;
    let pr = state
        .assignments
        .create(&req.pull_request_id, &req.pull_request_name, &req.author_id)
        .await?;

    Ok((StatusCode::CREATED, Json(PullRequestEnvelope { pr })))
}

/// POST /pullRequest/merge
async fn merge(
    State(state): State<AppState>,
    body: Result<Json<MergeRequest>, JsonRejection>,
) -> Result<Json<PullRequestEnvelope>, ApiErr> {
    let Json(req) = body?;
    let pr = state.assignments.merge(&req.pull_request_id).await?;

    Ok(Json(PullRequestEnvelope { pr }))
}

/// POST /pullRequest/reassign
async fn reassign(
    State(state): State<AppState>,
    body: Result<Json<ReassignRequest>, JsonRejection>,
) -> Result<Json<Reassignment>, ApiErr> {
    let Json(req) = body?;
    let result = state
        .assignments
        .reassign(&req.pull_request_id, &req.old_user_id)
        .await?;

    Ok(Json(result))
}
