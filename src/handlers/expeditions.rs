use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::entities::expedition_log;
use crate::errors::ServiceError;
use crate::{default_limit, default_page, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExpeditionListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// `loading` or `completed`.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OpenExpeditionRequest {
    pub dock_id: String,
    /// `left`, `right` or `single`.
    pub side: String,
    pub truck_id: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/expeditions",
    params(ExpeditionListQuery),
    responses(
        (status = 200, description = "Expedition page", body = PaginatedResponse<expedition_log::Model>)
    ),
    tag = "expeditions"
)]
pub async fn list_expeditions(
    State(state): State<AppState>,
    Query(query): Query<ExpeditionListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (logs, total) = state
        .services
        .expeditions
        .list(query.page, query.limit, query.status.as_deref())
        .await?;
    Ok(Json(PaginatedResponse::new(
        logs,
        total,
        query.page,
        query.limit,
    )))
}

/// Open a loading record for a dock side. One open record per dock+side.
#[utoipa::path(
    post,
    path = "/api/v1/expeditions",
    request_body = OpenExpeditionRequest,
    responses(
        (status = 201, description = "Loading record opened", body = expedition_log::Model),
        (status = 409, description = "Dock side already loading", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "expeditions"
)]
pub async fn open_expedition(
    State(state): State<AppState>,
    Json(payload): Json<OpenExpeditionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let log = state
        .services
        .expeditions
        .open(&payload.dock_id, &payload.side, &payload.truck_id)
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

#[utoipa::path(
    post,
    path = "/api/v1/expeditions/{id}/complete",
    params(("id" = Uuid, Path, description = "Expedition id")),
    responses(
        (status = 200, description = "Loading record completed", body = expedition_log::Model),
        (status = 400, description = "Record is not loading", body = crate::errors::ErrorResponse),
        (status = 404, description = "Record not found", body = crate::errors::ErrorResponse)
    ),
    tag = "expeditions"
)]
pub async fn complete_expedition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let log = state.services.expeditions.complete(id).await?;
    Ok(Json(log))
}
