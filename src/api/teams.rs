//! Team routes.

use crate::api::error::ApiErr;
use crate::api::AppState;
use crate::models::Team;
use crate::services::teams;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
struct TeamQuery {
    #[serde(default)]
    team_name: String,
}

#[derive(Serialize)]
struct TeamEnvelope {
    team: Team,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/team/add", post(add_team))
        .route("/team/get", get(get_team))
}

/// POST /team/add
async fn add_team(
    State(state): State<AppState>,
    body: Result<Json<Team>, JsonRejection>,
) -> Result<(StatusCode, Json<TeamEnvelope>), ApiErr> {
    let Json(team) = body?;
    let team = teams::create_team(&state.db, team).await?;

    Ok((StatusCode::CREATED, Json(TeamEnvelope { team })))
}

/// GET /team/get?team_name=X
async fn get_team(
    State(state): State<AppState>,
    Query(params): Query<TeamQuery>,
) -> Result<Json<Team>, ApiErr> {
    let team = teams::get_team(&state.db, &params.team_name).await?;
    Ok(Json(team))
}
