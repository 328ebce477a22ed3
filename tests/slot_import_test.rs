mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{response_json, TestApp};
use floorscan_api::domain::Role;

const ADMIN: &str = "admin@example.com";
const OPERATOR: &str = "op@example.com";

const CSV: &str = "code,size\nU0101A,Grande\nU0102B,Pequeño\nU0103C\n,Mediano\n";

async fn app_with_roles() -> TestApp {
    let app = TestApp::new().await;
    app.seed_profile(ADMIN, "Admin User", Role::Admin).await;
    app.seed_profile(OPERATOR, "Floor Operator", Role::Operator).await;
    app
}

#[tokio::test]
async fn import_creates_slots_and_reports_counts() {
    let app = app_with_roles().await;

    let response = app
        .request_text(Method::POST, "/api/v1/slots/import", CSV, Some(ADMIN))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let summary = response_json(response).await;
    assert_eq!(summary["imported"], 3);
    assert_eq!(summary["created"], 3);
    assert_eq!(summary["overwritten"], 0);
    assert_eq!(summary["skipped"], 1);

    // Missing size falls back to the default.
    let slot = response_json(
        app.request(Method::GET, "/api/v1/slots/U0103C", None, Some(OPERATOR))
            .await,
    )
    .await;
    assert_eq!(slot["size"], "Mediano");
    assert_eq!(slot["status"], "empty");
    assert_eq!(slot["is_scanned_once"], false);
}

#[tokio::test]
async fn reimport_overwrites_and_resets_occupancy_state() {
    let app = app_with_roles().await;

    app.request_text(Method::POST, "/api/v1/slots/import", CSV, Some(ADMIN))
        .await;

    // Confirm one slot through a capture so it carries occupancy state.
    let capture = response_json(
        app.request(
            Method::POST,
            "/api/v1/captures",
            Some(json!({ "slot_code": "U0101A" })),
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
    app.request(
        Method::POST,
        &format!("/api/v1/captures/{id}/complete"),
        Some(json!({ "quantity": 100 })),
        Some(OPERATOR),
    )
    .await;

    let response = app
        .request_text(Method::POST, "/api/v1/slots/import", CSV, Some(ADMIN))
        .await;
    let summary = response_json(response).await;
    assert_eq!(summary["created"], 0);
    assert_eq!(summary["overwritten"], 3);

    let slot = response_json(
        app.request(Method::GET, "/api/v1/slots/U0101A", None, Some(OPERATOR))
            .await,
    )
    .await;
    assert_eq!(slot["quantity"], 0);
    assert_eq!(slot["status"], "empty");
    assert_eq!(slot["is_scanned_once"], false);
}

#[tokio::test]
async fn import_is_admin_only() {
    let app = app_with_roles().await;

    let response = app
        .request_text(Method::POST, "/api/v1/slots/import", CSV, Some(OPERATOR))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request_text(Method::POST, "/api/v1/slots/import", CSV, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn slot_listing_supports_zone_and_search_filters() {
    let app = app_with_roles().await;

    let csv = "code,size\nU0101A,Grande\nU0102B,Mediano\nV0201C,Pequeño\n";
    app.request_text(Method::POST, "/api/v1/slots/import", csv, Some(ADMIN))
        .await;

    let page = response_json(
        app.request(Method::GET, "/api/v1/slots?zone=U01", None, Some(OPERATOR))
            .await,
    )
    .await;
    assert_eq!(page["total"], 2);

    let page = response_json(
        app.request(
            Method::GET,
            "/api/v1/slots?search=0201",
            None,
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["code"], "V0201C");
}

#[tokio::test]
async fn find_available_returns_the_smallest_unfilled_code() {
    let app = app_with_roles().await;

    let csv = "code,size\nU0102B,Grande\nU0101A,Grande\n";
    app.request_text(Method::POST, "/api/v1/slots/import", csv, Some(ADMIN))
        .await;

    let body = response_json(
        app.request(
            Method::GET,
            "/api/v1/slots/find-available?size=Grande",
            None,
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    assert_eq!(body["slot"]["code"], "U0101A");

    let body = response_json(
        app.request(
            Method::GET,
            "/api/v1/slots/find-available?size=Peque%C3%B1o",
            None,
            Some(OPERATOR),
        )
        .await,
    )
    .await;
    assert!(body["slot"].is_null());
}
