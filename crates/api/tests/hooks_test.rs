
use axum::http::{HeaderName, HeaderValue, StatusCode};
use chrono::Duration;
use coachline_core::models::views::BookView;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_utils::*;

const SECRET_HEADER: HeaderName = HeaderName::from_static("x-webhook-secret");

#[tokio::test]
async fn test_hook_rejects_missing_or_wrong_secret() {
    let app = TestApp::new();
    let payload = json!({ "type": "INSERT", "table": "openings", "record": null });

    app.server
        .post("/hooks/changes")
        .json(&payload)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    app.server
        .post("/hooks/changes")
        .add_header(SECRET_HEADER, HeaderValue::from_static("guess"))
        .json(&payload)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reported_change_refreshes_cached_views() {
    let app = TestApp::new();

    let before: BookView = as_user(app.server.get("/client/book"), CLIENT_TOKEN).await.json();
    assert!(before.openings.items().is_empty());

    // Written by someone else; the cached view does not know yet.
    let opening = app.backend.add_opening(Duration::days(1), 1);
    let stale: BookView = as_user(app.server.get("/client/book"), CLIENT_TOKEN).await.json();
    assert!(stale.openings.items().is_empty());

    app.server
        .post("/hooks/changes")
        .add_header(SECRET_HEADER, HeaderValue::from_static("hook-secret"))
        .json(&json!({
            "type": "INSERT",
            "table": "openings",
            "record": { "id": opening.id },
            "old_record": null
        }))
        .await
        .assert_status(StatusCode::ACCEPTED);

    let fresh: BookView = as_user(app.server.get("/client/book"), CLIENT_TOKEN).await.json();
    assert_eq!(fresh.openings.items().len(), 1);
    assert_eq!(fresh.openings.items()[0].id, opening.id);
}

#[tokio::test]
async fn test_untracked_tables_are_accepted_and_ignored() {
    let app = TestApp::new();

    app.server
        .post("/hooks/changes")
        .add_header(SECRET_HEADER, HeaderValue::from_static("hook-secret"))
        .json(&json!({ "type": "UPDATE", "table": "audit_log", "record": { "id": 1 } }))
        .await
        .assert_status(StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_change_stream_requires_a_session() {
    let app = TestApp::new();

    let response = app.server.get("/events").await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login");
}
