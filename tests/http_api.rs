//! HTTP API tests.
//!
//! Requests go through the full router (middleware included) via
//! `tower::ServiceExt::oneshot`, so status codes and JSON envelopes are
//! checked exactly as a client would see them.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pr_reviewer_lib::api::{router, AppState};
use pr_reviewer_lib::db::initialize;
use pr_reviewer_lib::services::ReviewerSelector;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

async fn setup() -> (TempDir, Router) {
    let dir = tempdir().unwrap();
    let pool = initialize(&dir.path().join("test.db"), 4).await.unwrap();
    let app = router(AppState::new(pool, ReviewerSelector::seeded(9)));
    (dir, app)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn add_backend_team(app: &Router) {
    let (status, _) = send(
        app,
        "POST",
        "/team/add",
        Some(json!({
            "team_name": "backend",
            "members": [
                {"user_id": "A", "username": "Alice", "is_active": true},
                {"user_id": "B", "username": "Bob", "is_active": true},
                {"user_id": "C", "username": "Carol", "is_active": true}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap()
}

#[tokio::test]
async fn test_healthz() {
    let (_dir, app) = setup().await;

    let (status, body) = send(&app, "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_team_add_and_get() {
    let (_dir, app) = setup().await;
    add_backend_team(&app).await;

    let (status, body) = send(&app, "GET", "/team/get?team_name=backend", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team_name"], "backend");
    assert_eq!(body["members"].as_array().unwrap().len(), 3);
    assert_eq!(body["members"][0]["user_id"], "A");

    let (status, body) = send(&app, "GET", "/team/get?team_name=nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_team_conflicts() {
    let (_dir, app) = setup().await;
    add_backend_team(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/team/add",
        Some(json!({"team_name": "backend", "members": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "TEAM_EXISTS");

    let (status, body) = send(
        &app,
        "POST",
        "/team/add",
        Some(json!({
            "team_name": "frontend",
            "members": [{"user_id": "A", "username": "Alice", "is_active": true}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "MEMBER_EXISTS");
}

#[tokio::test]
async fn test_pull_request_lifecycle() {
    let (_dir, app) = setup().await;
    add_backend_team(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/create",
        Some(json!({"pull_request_id": "pr1", "pull_request_name": "Add feature", "author_id": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pr"]["status"], "OPEN");
    let mut reviewers: Vec<&str> = body["pr"]["assigned_reviewers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    reviewers.sort();
    assert_eq!(reviewers, vec!["B", "C"]);

    // Duplicate
    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/create",
        Some(json!({"pull_request_id": "pr1", "pull_request_name": "Again", "author_id": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_EXISTS");

    // Review listing
    let (status, body) = send(&app, "GET", "/users/getReview?user_id=B", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "B");
    assert_eq!(body["pull_requests"][0]["pull_request_id"], "pr1");

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr1", "old_user_id": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "NO_CANDIDATE");

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/merge",
        Some(json!({"pull_request_id": "pr1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["status"], "MERGED");
    let merged_at = body["pr"]["merged_at"].clone();
    assert!(!merged_at.is_null());

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/merge",
        Some(json!({"pull_request_id": "pr1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pr"]["merged_at"], merged_at);

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr1", "old_user_id": "B"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_MERGED");
}

#[tokio::test]
async fn test_reassign_envelope() {
    let (_dir, app) = setup().await;
    let (status, _) = send(
        &app,
        "POST",
        "/team/add",
        Some(json!({
            "team_name": "platform",
            "members": [
                {"user_id": "P1", "username": "Pat", "is_active": true},
                {"user_id": "P2", "username": "Pam", "is_active": true},
                {"user_id": "P3", "username": "Pia", "is_active": true},
                {"user_id": "P4", "username": "Pol", "is_active": true}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(
        &app,
        "POST",
        "/pullRequest/create",
        Some(json!({"pull_request_id": "pr1", "pull_request_name": "T", "author_id": "P1"})),
    )
    .await;
    let reviewers: Vec<String> = body["pr"]["assigned_reviewers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(reviewers.len(), 2);

    // Exactly one teammate is left over, so the replacement is known
    let leftover = ["P2", "P3", "P4"]
        .into_iter()
        .find(|id| !reviewers.iter().any(|r| r == id))
        .unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr1", "old_user_id": reviewers[0]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced_by"], leftover);
    assert_eq!(body["pr"]["assigned_reviewers"], json!([reviewers[1], leftover]));

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/reassign",
        Some(json!({"pull_request_id": "pr1", "old_user_id": "P1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "NOT_ASSIGNED");
}

#[tokio::test]
async fn test_set_is_active_and_stats() {
    let (_dir, app) = setup().await;
    add_backend_team(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/users/setIsActive",
        Some(json!({"user_id": "C", "is_active": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_active"], false);
    assert_eq!(body["user"]["team_name"], "backend");

    let (_, body) = send(
        &app,
        "POST",
        "/pullRequest/create",
        Some(json!({"pull_request_id": "pr1", "pull_request_name": "T", "author_id": "A"})),
    )
    .await;
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["B"]));

    let (status, body) = send(&app, "GET", "/stats/assignments", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assignments"], json!([{"user_id": "B", "count": 1}]));

    let (status, body) = send(
        &app,
        "POST",
        "/users/setIsActive",
        Some(json!({"user_id": "ghost", "is_active": true})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_bad_requests() {
    let (_dir, app) = setup().await;

    let (status, body) = send(
        &app,
        "POST",
        "/pullRequest/create",
        Some(json!({"pull_request_id": " ", "pull_request_name": "T", "author_id": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    // Missing fields read as blank
    let (status, body) = send(&app, "POST", "/pullRequest/merge", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");

    let request = Request::builder()
        .method("POST")
        .uri("/pullRequest/merge")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/users/getReview?user_id=ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}
