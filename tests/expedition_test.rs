mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{response_json, TestApp};
use floorscan_api::domain::Role;

const DOCK_LEAD: &str = "dock@example.com";
const OPERATOR: &str = "op@example.com";

async fn app_with_roles() -> TestApp {
    let app = TestApp::new().await;
    app.seed_profile(DOCK_LEAD, "Dock Lead", Role::Expedition).await;
    app.seed_profile(OPERATOR, "Floor Operator", Role::Operator).await;
    app
}

#[tokio::test]
async fn one_loading_record_per_dock_side() {
    let app = app_with_roles().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/expeditions",
            Some(json!({ "dock_id": "D1", "side": "LEFT", "truck_id": "TR-9" })),
            Some(DOCK_LEAD),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let log = response_json(response).await;
    assert_eq!(log["status"], "loading");
    assert_eq!(log["side"], "left");
    let id = log["id"].as_str().unwrap().to_string();

    // Same dock and side while still loading conflicts.
    let response = app
        .request(
            Method::POST,
            "/api/v1/expeditions",
            Some(json!({ "dock_id": "D1", "side": "left", "truck_id": "TR-10" })),
            Some(DOCK_LEAD),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The other side of the dock is independent.
    let response = app
        .request(
            Method::POST,
            "/api/v1/expeditions",
            Some(json!({ "dock_id": "D1", "side": "right", "truck_id": "TR-10" })),
            Some(DOCK_LEAD),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Completing frees the side for the next truck.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/expeditions/{id}/complete"),
            None,
            Some(DOCK_LEAD),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let completed = response_json(response).await;
    assert_eq!(completed["status"], "completed");
    assert!(!completed["finished_at"].is_null());

    let response = app
        .request(
            Method::POST,
            "/api/v1/expeditions",
            Some(json!({ "dock_id": "D1", "side": "left", "truck_id": "TR-11" })),
            Some(DOCK_LEAD),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn completing_twice_is_an_invalid_operation() {
    let app = app_with_roles().await;

    let log = response_json(
        app.request(
            Method::POST,
            "/api/v1/expeditions",
            Some(json!({ "dock_id": "D2", "side": "single", "truck_id": "TR-1" })),
            Some(DOCK_LEAD),
        )
        .await,
    )
    .await;
    let id = log["id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/expeditions/{id}/complete");
    app.request(Method::POST, &uri, None, Some(DOCK_LEAD)).await;
    let response = app.request(Method::POST, &uri, None, Some(DOCK_LEAD)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn opening_requires_the_expedition_role() {
    let app = app_with_roles().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/expeditions",
            Some(json!({ "dock_id": "D1", "side": "left", "truck_id": "TR-9" })),
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Reads stay open to any operator.
    let response = app
        .request(Method::GET, "/api/v1/expeditions", None, Some(OPERATOR))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_sides_are_rejected() {
    let app = app_with_roles().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/expeditions",
            Some(json!({ "dock_id": "D1", "side": "middle", "truck_id": "TR-9" })),
            Some(DOCK_LEAD),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
