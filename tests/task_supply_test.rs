mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{response_json, TestApp};
use floorscan_api::domain::Role;

const ADMIN: &str = "admin@example.com";
const OPERATOR: &str = "op@example.com";

async fn app_with_roles() -> TestApp {
    let app = TestApp::new().await;
    app.seed_profile(ADMIN, "Admin User", Role::Admin).await;
    app.seed_profile(OPERATOR, "Floor Operator", Role::Operator).await;
    app
}

#[tokio::test]
async fn starting_a_task_closes_the_previous_one() {
    let app = app_with_roles().await;

    for (name, timed) in [("Picking", true), ("Cleaning", false)] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/tasks",
                Some(json!({ "name": name, "allowed_roles": ["operator"], "is_timed": timed })),
                Some(ADMIN),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .request(
            Method::POST,
            "/api/v1/tasks/start",
            Some(json!({ "task_name": "Picking" })),
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Switching tasks leaves exactly one open log.
    app.request(
        Method::POST,
        "/api/v1/tasks/start",
        Some(json!({ "task_name": "Cleaning" })),
        Some(OPERATOR),
    )
    .await;

    let active = response_json(
        app.request(Method::GET, "/api/v1/tasks/active", None, Some(OPERATOR))
            .await,
    )
    .await;
    assert_eq!(active["active"]["task"]["name"], "Cleaning");
    assert!(active["active"]["log"]["end_time"].is_null());

    let finished = response_json(
        app.request(Method::POST, "/api/v1/tasks/finish", None, Some(OPERATOR))
            .await,
    )
    .await;
    assert_eq!(finished["active"]["task"]["name"], "Cleaning");
    assert!(!finished["active"]["log"]["end_time"].is_null());

    let active = response_json(
        app.request(Method::GET, "/api/v1/tasks/active", None, Some(OPERATOR))
            .await,
    )
    .await;
    assert!(active["active"].is_null());
}

#[tokio::test]
async fn tasks_enforce_their_allowed_roles() {
    let app = app_with_roles().await;

    app.request(
        Method::POST,
        "/api/v1/tasks",
        Some(json!({ "name": "Dock check", "allowed_roles": ["expedition"] })),
        Some(ADMIN),
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/tasks/start",
            Some(json!({ "task_name": "Dock check" })),
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn supply_adjustments_are_audited_and_bounded() {
    let app = app_with_roles().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/supplies",
            Some(json!({ "name": "Stretch film", "quantity": 10, "min_quantity": 4, "unit": "rolls" })),
            Some(ADMIN),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let supply = response_json(response).await;
    let id = supply["id"].as_str().unwrap().to_string();

    let adjusted = response_json(
        app.request(
            Method::POST,
            &format!("/api/v1/supplies/{id}/adjust"),
            Some(json!({ "change_amount": -7, "comment": "wrap station" })),
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    assert_eq!(adjusted["quantity"], 3);

    // Going below zero is refused.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/supplies/{id}/adjust"),
            Some(json!({ "change_amount": -4 })),
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // The counter sits below its minimum now.
    let low = response_json(
        app.request(Method::GET, "/api/v1/supplies/low", None, Some(OPERATOR))
            .await,
    )
    .await;
    assert_eq!(low.as_array().unwrap().len(), 1);

    let logs = response_json(
        app.request(
            Method::GET,
            &format!("/api/v1/supplies/{id}/logs"),
            None,
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["change_amount"], -7);
    assert_eq!(logs[0]["operator_email"], OPERATOR);
}

#[tokio::test]
async fn profile_me_reflects_the_identity_header() {
    let app = app_with_roles().await;

    let me = response_json(
        app.request(Method::GET, "/api/v1/profiles/me", None, Some(OPERATOR))
            .await,
    )
    .await;
    assert_eq!(me["email"], OPERATOR);
    assert_eq!(me["role"], "operator");

    // Profile administration is gated.
    let response = app
        .request(Method::GET, "/api/v1/profiles", None, Some(OPERATOR))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
