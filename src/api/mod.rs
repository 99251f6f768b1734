//! HTTP API.
//!
//! Thin axum handlers over the services. Each handler parses its body or
//! query, calls one service function and renders the result; error mapping
//! lives in [`error`].

pub mod error;
mod pull_requests;
mod teams;
mod users;

use crate::db::pool::DbPool;
use crate::db::SqliteStore;
use crate::services::{AssignmentService, ReviewerSelector};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub assignments: Arc<AssignmentService>,
}

impl AppState {
    /// Wire the assignment engine to the SQLite store behind `db`.
    pub fn new(db: DbPool, selector: ReviewerSelector) -> Self {
        let store = Arc::new(SqliteStore::new(db.clone()));
        let assignments = Arc::new(AssignmentService::new(store.clone(), store, selector));
        Self { db, assignments }
    }
}

/// Build the full router with request logging.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(teams::routes())
        .merge(users::routes())
        .merge(pull_requests::routes())
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
        .layer(CorsLayer::permissive())
}

/// GET /healthz
async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Log method, path, status and latency for every request.
async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = started.elapsed();
    if status.is_server_error() {
        log::error!("[server] {} {} -> {} in {:?}", method, path, status, elapsed);
    } else {
        log::info!("[server] {} {} -> {} in {:?}", method, path, status, elapsed);
    }

    response
}
