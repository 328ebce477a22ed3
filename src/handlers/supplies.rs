use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::OperatorIdentity;
use crate::entities::{warehouse_supply, warehouse_supply_log};
use crate::errors::ServiceError;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSupplyRequest {
    pub name: String,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub min_quantity: i32,
    pub unit: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdjustSupplyRequest {
    /// Signed change; negative consumes stock.
    pub change_amount: i32,
    pub comment: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/supplies",
    responses(
        (status = 200, description = "All supplies", body = [warehouse_supply::Model])
    ),
    tag = "supplies"
)]
pub async fn list_supplies(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplies = state.services.supplies.list().await?;
    Ok(Json(supplies))
}

/// Supplies at or below their minimum level.
#[utoipa::path(
    get,
    path = "/api/v1/supplies/low",
    responses(
        (status = 200, description = "Supplies needing restock", body = [warehouse_supply::Model])
    ),
    tag = "supplies"
)]
pub async fn low_supplies(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let supplies = state.services.supplies.low().await?;
    Ok(Json(supplies))
}

#[utoipa::path(
    post,
    path = "/api/v1/supplies",
    request_body = CreateSupplyRequest,
    responses(
        (status = 201, description = "Supply created", body = warehouse_supply::Model),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "supplies"
)]
pub async fn create_supply(
    State(state): State<AppState>,
    Json(payload): Json<CreateSupplyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let supply = state
        .services
        .supplies
        .create(
            &payload.name,
            payload.quantity,
            payload.min_quantity,
            &payload.unit,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(supply)))
}

/// Apply a signed change to a supply counter. The change is audited with
/// the caller's email.
#[utoipa::path(
    post,
    path = "/api/v1/supplies/{id}/adjust",
    params(("id" = Uuid, Path, description = "Supply id")),
    request_body = AdjustSupplyRequest,
    responses(
        (status = 200, description = "Supply adjusted", body = warehouse_supply::Model),
        (status = 400, description = "Counter would go negative", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supply not found", body = crate::errors::ErrorResponse)
    ),
    tag = "supplies"
)]
pub async fn adjust_supply(
    State(state): State<AppState>,
    identity: OperatorIdentity,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustSupplyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let supply = state
        .services
        .supplies
        .adjust(id, payload.change_amount, payload.comment, &identity.email)
        .await?;
    Ok(Json(supply))
}

#[utoipa::path(
    get,
    path = "/api/v1/supplies/{id}/logs",
    params(("id" = Uuid, Path, description = "Supply id")),
    responses(
        (status = 200, description = "Adjustment history, newest first", body = [warehouse_supply_log::Model])
    ),
    tag = "supplies"
)]
pub async fn supply_logs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let logs = state.services.supplies.logs(id).await?;
    Ok(Json(logs))
}
