//! User routes: activation, review listing and workload stats.

use crate::api::error::ApiErr;
use crate::api::AppState;
use crate::models::{PullRequestShort, ReviewerStat, User};
use crate::services::users;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct SetActiveRequest {
    #[serde(default)]
    user_id: String,
    is_active: bool,
}

#[derive(Deserialize)]
struct UserQuery {
    #[serde(default)]
    user_id: String,
}

#[derive(Serialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Serialize)]
struct ReviewResponse {
    user_id: String,
    pull_requests: Vec<PullRequestShort>,
}

#[derive(Serialize)]
struct StatsResponse {
    assignments: Vec<ReviewerStat>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/setIsActive", post(set_is_active))
        .route("/users/getReview", get(get_review))
        .route("/stats/assignments", get(assignment_stats))
}

/// POST /users/setIsActive
async fn set_is_active(
    State(state): State<AppState>,
    body: Result<Json<SetActiveRequest>, JsonRejection>,
) -> Result<Json<UserEnvelope>, ApiErr> {
    let Json(req) = body?;
    let user = users::set_is_active(&state.db, &req.user_id, req.is_active).await?;

    Ok(Json(UserEnvelope { user }))
}

/// GET /users/getReview?user_id=X
async fn get_review(
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> Result<Json<ReviewResponse>, ApiErr> {
    let pull_requests = users::get_review(&state.db, &params.user_id).await?;

    Ok(Json(ReviewResponse {
        user_id: params.user_id.trim().to_string(),
        pull_requests,
    }))
}

/// GET /stats/assignments
async fn assignment_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiErr> {
    let assignments = users::reviewer_stats(&state.db).await?;
    Ok(Json(StatsResponse { assignments }))
}
