use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::scanner::Detection;
use crate::AppState;

/// Stale scanner modals are evicted when a new session opens.
const SESSION_MAX_AGE_SECS: i64 = 15 * 60;

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanSessionOpened {
    pub id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DetectionRequest {
    /// Raw decoded candidate from the barcode reader.
    pub code: String,
}

/// Open a scan session (one scanner-modal lifetime).
#[utoipa::path(
    post,
    path = "/api/v1/scan-sessions",
    responses(
        (status = 201, description = "Scan session opened", body = ScanSessionOpened),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "scanning"
)]
pub async fn open_session(State(state): State<AppState>) -> impl IntoResponse {
    state.services.scan_sessions.evict_stale(SESSION_MAX_AGE_SECS);
    let id = state.services.scan_sessions.open();
    (StatusCode::CREATED, Json(ScanSessionOpened { id }))
}

/// Feed one raw decode event into a session's confidence filter.
#[utoipa::path(
    post,
    path = "/api/v1/scan-sessions/{id}/detections",
    params(("id" = Uuid, Path, description = "Scan session id")),
    request_body = DetectionRequest,
    responses(
        (status = 200, description = "Filter state after the event", body = Detection),
        (status = 404, description = "Unknown session", body = crate::errors::ErrorResponse)
    ),
    tag = "scanning"
)]
pub async fn observe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DetectionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let detection = state.services.scan_sessions.observe(id, &payload.code)?;
    Ok(Json(detection))
}

/// Close a scan session. Re-opening is the retry path after camera failures.
#[utoipa::path(
    delete,
    path = "/api/v1/scan-sessions/{id}",
    params(("id" = Uuid, Path, description = "Scan session id")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Unknown session", body = crate::errors::ErrorResponse)
    ),
    tag = "scanning"
)]
pub async fn close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.scan_sessions.close(id)?;
    Ok(StatusCode::NO_CONTENT)
}
