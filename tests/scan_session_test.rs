mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{response_json, TestApp};
use floorscan_api::domain::Role;

const OPERATOR: &str = "scanner@example.com";

async fn open_session(app: &TestApp) -> String {
    let response = app
        .request(Method::POST, "/api/v1/scan-sessions", None, Some(OPERATOR))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    response_json(response).await["id"]
        .as_str()
        .expect("session id")
        .to_string()
}

async fn observe(app: &TestApp, session: &str, code: &str) -> serde_json::Value {
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/scan-sessions/{session}/detections"),
            Some(json!({ "code": code })),
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    response_json(response).await
}

#[tokio::test]
async fn three_identical_frames_accept_the_code_once() {
    let app = TestApp::new().await;
    app.seed_profile(OPERATOR, "Scan Operator", Role::Operator).await;
    let session = open_session(&app).await;

    // A noisy frame resets nothing yet; the B streak then builds up.
    let detection = observe(&app, &session, "A-01").await;
    assert_eq!(detection["state"], "pending");
    assert_eq!(detection["streak"], 1);

    let detection = observe(&app, &session, "B-02").await;
    assert_eq!(detection["state"], "pending");
    assert_eq!(detection["streak"], 1);

    let detection = observe(&app, &session, "B-02").await;
    assert_eq!(detection["streak"], 2);

    let detection = observe(&app, &session, "B-02").await;
    assert_eq!(detection["state"], "accepted");
    assert_eq!(detection["code"], "B-02");

    // Further frames never emit a second accept for this session.
    let detection = observe(&app, &session, "B-02").await;
    assert_eq!(detection["state"], "already_accepted");
    let detection = observe(&app, &session, "C-03").await;
    assert_eq!(detection["state"], "already_accepted");
}

#[tokio::test]
async fn closed_sessions_stop_accepting_frames() {
    let app = TestApp::new().await;
    app.seed_profile(OPERATOR, "Scan Operator", Role::Operator).await;
    let session = open_session(&app).await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/scan-sessions/{session}"),
            None,
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/scan-sessions/{session}/detections"),
            Some(json!({ "code": "B-02" })),
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
