
use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode, header::COOKIE};
use coachline_core::models::auth::UserMetadata;
use coachline_remote::{RemoteError, mock::MockProfileRepo};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;
use test_utils::*;

#[rstest]
#[case("/client/book")]
#[case("/client/dashboard")]
#[case("/coach/requests")]
#[case("/settings")]
#[case("/complete-account")]
#[tokio::test]
async fn test_anonymous_request_redirects_to_login(#[case] path: &str) {
    let app = TestApp::new();

    let response = app.server.get(path).await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login");
}

#[tokio::test]
async fn test_unknown_token_counts_as_signed_out() {
    let app = TestApp::new();

    let response = as_user(app.server.get("/client/dashboard"), "expired-token").await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/login");
}

#[rstest]
#[case("/client/dashboard")]
#[case("/client/book")]
#[case("/settings")]
#[tokio::test]
async fn test_incomplete_account_is_sent_to_completion(#[case] path: &str) {
    let app = TestApp::new();

    let response = as_user(app.server.get(path), INCOMPLETE_TOKEN).await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/complete-account");
}

#[tokio::test]
async fn test_completion_page_is_reachable_while_incomplete() {
    let app = TestApp::new();

    let response = as_user(app.server.get("/complete-account"), INCOMPLETE_TOKEN).await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_coach_is_kept_out_of_client_screens() {
    let app = TestApp::new();

    let response = as_user(app.server.get("/client/book"), COACH_TOKEN).await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/coach/dashboard");
}

#[tokio::test]
async fn test_client_is_kept_out_of_coach_screens() {
    let app = TestApp::new();

    let response = as_user(app.server.get("/coach/requests"), CLIENT_TOKEN).await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/client/dashboard");
}

#[rstest]
#[case("/coach/dashboard")]
#[case("/coach/requests")]
#[tokio::test]
async fn test_coach_with_incomplete_metadata_is_sent_to_completion(#[case] path: &str) {
    let app = TestApp::new();
    app.backend
        .world()
        .sessions
        .get_mut(COACH_TOKEN)
        .unwrap()
        .user_metadata = UserMetadata::default();

    let response = as_user(app.server.get(path), COACH_TOKEN).await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/complete-account");
}

#[tokio::test]
async fn test_profile_lookup_failure_is_reported_not_redirected() {
    let mut profiles = MockProfileRepo::new();
    profiles
        .expect_get_profile()
        .returning(|_, _| Err(RemoteError::api(503, "backend down")));
    profiles
        .expect_get_app_settings()
        .returning(|_| Err(RemoteError::api(503, "backend down")));
    profiles.expect_create_player().never();
    let app = TestApp::with_backends(|b| b.profiles = Arc::new(profiles));

    let response = as_user(app.server.get("/coach/dashboard"), COACH_TOKEN).await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["error"], "backend down");
}

#[tokio::test]
async fn test_settings_client_error_passes_through() {
    let mut profiles = MockProfileRepo::new();
    profiles.expect_get_profile().returning(|_, _| Ok(None));
    profiles
        .expect_get_app_settings()
        .returning(|_| Err(RemoteError::api(403, "permission denied for table app_settings")));
    let app = TestApp::with_backends(|b| b.profiles = Arc::new(profiles));

    let response = as_user(app.server.get("/client/dashboard"), CLIENT_TOKEN).await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["error"], "permission denied for table app_settings");
}

#[tokio::test]
async fn test_designation_overrides_stored_role() {
    let app = TestApp::new();
    {
        let mut world = app.backend.world();
        let coach_id = app.backend.coach_id;
        world.profiles.get_mut(&coach_id).unwrap().role = coachline_core::models::profile::Role::Client;
    }

    let response = as_user(app.server.get("/coach/dashboard"), COACH_TOKEN).await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/client/dashboard")
        .add_header(COOKIE, HeaderValue::from_static("coachline-session=client-token"))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_public_paths_need_no_session() {
    let app = TestApp::new();

    app.server.get("/health").await.assert_status_ok();
    app.server.get("/login").await.assert_status_ok();
    app.server.get("/").await.assert_status_ok();
}
