use axum::{
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::OperatorIdentity;
use crate::capture::{CaptureFlow, CaptureStep};
use crate::domain::{Occupancy, SlotSize};
use crate::entities::{movement_log, warehouse_slot};
use crate::errors::ServiceError;
use crate::services::speech::SAMPLE_RATE_HZ;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct BeginCaptureRequest {
    /// Scanned or typed slot code.
    pub slot_code: String,
    /// Whether this workflow must record a cart id (the find-available path).
    #[serde(default)]
    pub cart_required: bool,
    pub cart_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectSizeRequest {
    pub size: SlotSize,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProvideCartRequest {
    pub cart_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteCaptureRequest {
    /// Occupancy level: 0, 50 or 100.
    pub quantity: i32,
}

/// Client view of an in-flight capture.
#[derive(Debug, Serialize, ToSchema)]
pub struct CaptureView {
    pub id: Uuid,
    pub slot_code: String,
    pub step: CaptureStep,
    pub size: Option<SlotSize>,
    pub cart_id: Option<String>,
    /// Stored occupancy at entry, shown next to the new level prompt.
    pub old_quantity: i32,
}

impl CaptureView {
    fn from_flow(id: Uuid, flow: CaptureFlow) -> Self {
        Self {
            id,
            slot_code: flow.slot_code,
            step: flow.step,
            size: flow.size,
            cart_id: flow.cart_id,
            old_quantity: flow.old_quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CaptureCompleted {
    pub slot: warehouse_slot::Model,
    pub log: movement_log::Model,
}

/// Begin a capture for a slot code.
#[utoipa::path(
    post,
    path = "/api/v1/captures",
    request_body = BeginCaptureRequest,
    responses(
        (status = 201, description = "Capture started", body = CaptureView),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "captures"
)]
pub async fn begin_capture(
    State(state): State<AppState>,
    _identity: OperatorIdentity,
    Json(payload): Json<BeginCaptureRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let (id, flow) = state
        .services
        .captures
        .begin(&payload.slot_code, payload.cart_required, payload.cart_id)
        .await?;
    Ok((StatusCode::CREATED, Json(CaptureView::from_flow(id, flow))))
}

pub async fn get_capture(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let flow = state.services.captures.get(id)?;
    Ok(Json(CaptureView::from_flow(id, flow)))
}

/// Select the slot size (size step).
#[utoipa::path(
    post,
    path = "/api/v1/captures/{id}/size",
    params(("id" = Uuid, Path, description = "Capture id")),
    request_body = SelectSizeRequest,
    responses(
        (status = 200, description = "Capture advanced", body = CaptureView),
        (status = 400, description = "Wrong step", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown capture", body = crate::errors::ErrorResponse)
    ),
    tag = "captures"
)]
pub async fn select_size(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectSizeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let flow = state.services.captures.select_size(id, payload.size)?;
    Ok(Json(CaptureView::from_flow(id, flow)))
}

/// Supply the cart id (cart_input step).
#[utoipa::path(
    post,
    path = "/api/v1/captures/{id}/cart",
    params(("id" = Uuid, Path, description = "Capture id")),
    request_body = ProvideCartRequest,
    responses(
        (status = 200, description = "Capture advanced", body = CaptureView),
        (status = 400, description = "Empty cart id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown capture", body = crate::errors::ErrorResponse)
    ),
    tag = "captures"
)]
pub async fn provide_cart(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProvideCartRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let flow = state.services.captures.provide_cart(id, &payload.cart_id)?;
    Ok(Json(CaptureView::from_flow(id, flow)))
}

/// Complete the capture: persist the slot state and append the audit row.
#[utoipa::path(
    post,
    path = "/api/v1/captures/{id}/complete",
    params(("id" = Uuid, Path, description = "Capture id")),
    request_body = CompleteCaptureRequest,
    responses(
        (status = 200, description = "Capture persisted", body = CaptureCompleted),
        (status = 400, description = "Invalid quantity or step", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown capture", body = crate::errors::ErrorResponse)
    ),
    tag = "captures"
)]
pub async fn complete_capture(
    State(state): State<AppState>,
    identity: OperatorIdentity,
    Path(id): Path<Uuid>,
    Json(payload): Json<CompleteCaptureRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let quantity = Occupancy::try_from(payload.quantity)?;
    let (slot, log) = state
        .services
        .captures
        .complete(id, quantity, &identity.full_name, &identity.email)
        .await?;
    Ok(Json(CaptureCompleted { slot, log }))
}

pub async fn cancel_capture(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.captures.cancel(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Raw PCM announcement audio for a completed capture, if the speech
/// collaborator produced one. 16-bit mono at 24kHz.
pub async fn get_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let pcm = state
        .services
        .captures
        .take_announcement(id)
        .ok_or_else(|| ServiceError::NotFound(format!("no announcement for capture {id}")))?;
    Ok((
        [
            (header::CONTENT_TYPE, "audio/L16".to_string()),
            (
                HeaderName::from_static("x-sample-rate"),
                SAMPLE_RATE_HZ.to_string(),
            ),
        ],
        pcm,
    ))
}
