use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::entities::movement_log;
use crate::errors::ServiceError;
use crate::services::movements::MovementFilter;
use crate::{default_limit, default_page, AppState, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct MovementListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub operator_email: Option<String>,
    pub slot_code: Option<String>,
}

/// List capture audit rows, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/movements",
    params(MovementListQuery),
    responses(
        (status = 200, description = "Movement page", body = PaginatedResponse<movement_log::Model>)
    ),
    tag = "movements"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = MovementFilter {
        from: query.from,
        to: query.to,
        operator_email: query.operator_email,
        slot_code: query.slot_code,
    };
    let (logs, total) = state
        .services
        .movements
        .list(query.page, query.limit, filter)
        .await?;
    Ok(Json(PaginatedResponse::new(
        logs,
        total,
        query.page,
        query.limit,
    )))
}
