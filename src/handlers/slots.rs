use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::SlotSize;
use crate::entities::warehouse_slot;
use crate::errors::ServiceError;
use crate::services::imports::ImportSummary;
use crate::{default_limit, default_page, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct SlotListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Case-insensitive fragment of the slot code.
    pub search: Option<String>,
    /// Zone prefix, e.g. `U01`.
    pub zone: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FindAvailableQuery {
    pub size: Option<SlotSize>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertSlotRequest {
    pub size: String,
    pub status: String,
    pub quantity: i32,
    #[serde(default)]
    pub is_scanned_once: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FindAvailableResponse {
    pub slot: Option<warehouse_slot::Model>,
}

/// List slots, paginated and optionally filtered.
#[utoipa::path(
    get,
    path = "/api/v1/slots",
    params(SlotListQuery),
    responses(
        (status = 200, description = "Slot page", body = PaginatedResponse<warehouse_slot::Model>)
    ),
    tag = "slots"
)]
pub async fn list_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (slots, total) = state
        .services
        .slots
        .list(
            query.page,
            query.limit,
            query.search.as_deref(),
            query.zone.as_deref(),
        )
        .await?;
    Ok(Json(PaginatedResponse::new(
        slots,
        total,
        query.page,
        query.limit,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/slots/{code}",
    params(("code" = String, Path, description = "Slot code")),
    responses(
        (status = 200, description = "Slot found", body = warehouse_slot::Model),
        (status = 404, description = "Slot not found", body = crate::errors::ErrorResponse)
    ),
    tag = "slots"
)]
pub async fn get_slot(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let code = code.trim().to_uppercase();
    let slot = state
        .services
        .slots
        .get_by_code(&code)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("slot {code} not found")))?;
    Ok(Json(slot))
}

/// First slot with spare capacity for the requested size, smallest code
/// first. The client follows up with a cart-required capture against it.
#[utoipa::path(
    get,
    path = "/api/v1/slots/find-available",
    params(FindAvailableQuery),
    responses(
        (status = 200, description = "Best candidate, if any", body = FindAvailableResponse)
    ),
    tag = "slots"
)]
pub async fn find_available(
    State(state): State<AppState>,
    Query(query): Query<FindAvailableQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let slot = state.services.slots.find_available(query.size).await?;
    Ok(Json(FindAvailableResponse { slot }))
}

/// Create or replace a slot row directly. Admin maintenance path; normal
/// occupancy changes go through captures.
#[utoipa::path(
    put,
    path = "/api/v1/slots/{code}",
    params(("code" = String, Path, description = "Slot code")),
    request_body = UpsertSlotRequest,
    responses(
        (status = 200, description = "Slot upserted", body = warehouse_slot::Model),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "slots"
)]
pub async fn upsert_slot(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(payload): Json<UpsertSlotRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return Err(ServiceError::Validation("slot code must not be empty".into()));
    }
    let slot = state
        .services
        .slots
        .upsert(
            &code,
            &payload.size,
            &payload.status,
            payload.quantity,
            payload.is_scanned_once,
        )
        .await?;
    Ok(Json(slot))
}

#[utoipa::path(
    delete,
    path = "/api/v1/slots/{code}",
    params(("code" = String, Path, description = "Slot code")),
    responses(
        (status = 204, description = "Slot deleted"),
        (status = 404, description = "Slot not found", body = crate::errors::ErrorResponse)
    ),
    tag = "slots"
)]
pub async fn delete_slot(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.slots.delete(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk-import slots from a `code,size` CSV body. Existing codes are
/// overwritten and their occupancy reset; the summary reports how many.
#[utoipa::path(
    post,
    path = "/api/v1/slots/import",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import summary", body = ImportSummary),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "slots"
)]
pub async fn import_slots(
    State(state): State<AppState>,
    body: String,
) -> Result<impl IntoResponse, ServiceError> {
    if body.trim().is_empty() {
        return Err(ServiceError::Validation("import body must not be empty".into()));
    }
    let summary = state.services.imports.import(&body).await?;
    Ok(Json(summary))
}
