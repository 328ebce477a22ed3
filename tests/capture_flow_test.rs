mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{response_json, TestApp};
use floorscan_api::domain::Role;

const OPERATOR: &str = "maria@example.com";

async fn app_with_operator() -> TestApp {
    let app = TestApp::new().await;
    app.seed_profile(OPERATOR, "Maria Lopez", Role::Operator).await;
    app
}

#[tokio::test]
async fn first_capture_of_a_slot_walks_size_then_status() {
    let app = app_with_operator().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/captures",
            Some(json!({ "slot_code": "u0101a" })),
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let capture = response_json(response).await;
    assert_eq!(capture["step"], "size");
    assert_eq!(capture["slot_code"], "U0101A");
    let id = capture["id"].as_str().expect("capture id").to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/captures/{id}/size"),
            Some(json!({ "size": "Grande" })),
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["step"], "status");

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/captures/{id}/complete"),
            Some(json!({ "quantity": 100 })),
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let completed = response_json(response).await;
    assert_eq!(completed["slot"]["code"], "U0101A");
    assert_eq!(completed["slot"]["quantity"], 100);
    assert_eq!(completed["slot"]["status"], "full");
    assert_eq!(completed["slot"]["is_scanned_once"], true);
    assert_eq!(completed["log"]["old_quantity"], 0);
    assert_eq!(completed["log"]["new_quantity"], 100);
    assert_eq!(completed["log"]["operator_email"], OPERATOR);

    // The audit row is visible through the movements listing.
    let response = app
        .request(Method::GET, "/api/v1/movements", None, Some(OPERATOR))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = response_json(response).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["slot_code"], "U0101A");
}

#[tokio::test]
async fn confirmed_slots_skip_straight_to_the_status_step() {
    let app = app_with_operator().await;

    // First pass confirms the slot at half occupancy.
    let capture = response_json(
        app.request(
            Method::POST,
            "/api/v1/captures",
            Some(json!({ "slot_code": "U0102B" })),
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    let id = capture["id"].as_str().unwrap().to_string();
    app.request(
        Method::POST,
        &format!("/api/v1/captures/{id}/size"),
        Some(json!({ "size": "Mediano" })),
        Some(OPERATOR),
    )
    .await;
    app.request(
        Method::POST,
        &format!("/api/v1/captures/{id}/complete"),
        Some(json!({ "quantity": 50 })),
        Some(OPERATOR),
    )
    .await;

    // Second pass starts at the status step with the stored level shown.
    let capture = response_json(
        app.request(
            Method::POST,
            "/api/v1/captures",
            Some(json!({ "slot_code": "U0102B" })),
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    assert_eq!(capture["step"], "status");
    assert_eq!(capture["old_quantity"], 50);
}

#[tokio::test]
async fn cart_required_capture_asks_for_the_cart_between_size_and_status() {
    let app = app_with_operator().await;

    let capture = response_json(
        app.request(
            Method::POST,
            "/api/v1/captures",
            Some(json!({ "slot_code": "U0103C", "cart_required": true })),
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    assert_eq!(capture["step"], "size");
    let id = capture["id"].as_str().unwrap().to_string();

    let after_size = response_json(
        app.request(
            Method::POST,
            &format!("/api/v1/captures/{id}/size"),
            Some(json!({ "size": "Pequeño" })),
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    assert_eq!(after_size["step"], "cart_input");

    // Completing while the cart is still owed is rejected.
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/captures/{id}/complete"),
            Some(json!({ "quantity": 100 })),
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let after_cart = response_json(
        app.request(
            Method::POST,
            &format!("/api/v1/captures/{id}/cart"),
            Some(json!({ "cart_id": "C-42" })),
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    assert_eq!(after_cart["step"], "status");
    assert_eq!(after_cart["cart_id"], "C-42");

    let completed = response_json(
        app.request(
            Method::POST,
            &format!("/api/v1/captures/{id}/complete"),
            Some(json!({ "quantity": 100 })),
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    assert_eq!(completed["log"]["cart_id"], "C-42");
}

#[tokio::test]
async fn invalid_occupancy_levels_are_rejected() {
    let app = app_with_operator().await;

    let capture = response_json(
        app.request(
            Method::POST,
            "/api/v1/captures",
            Some(json!({ "slot_code": "U0104D" })),
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    let id = capture["id"].as_str().unwrap().to_string();
    app.request(
        Method::POST,
        &format!("/api/v1/captures/{id}/size"),
        Some(json!({ "size": "Grande" })),
        Some(OPERATOR),
    )
    .await;

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/captures/{id}/complete"),
            Some(json!({ "quantity": 75 })),
            Some(OPERATOR),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn captures_require_a_known_operator() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/captures",
            Some(json!({ "slot_code": "U0101A" })),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A header naming an unknown operator is not an identity either.
    let response = app
        .request(
            Method::POST,
            "/api/v1/captures",
            Some(json!({ "slot_code": "U0101A" })),
            Some("ghost@example.com"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
