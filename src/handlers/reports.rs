use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::errors::ServiceError;
use crate::services::reports::{HeatmapReport, OperatorStats};
use crate::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct OperatorReportQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Per-operator activity for a date range: total actions and the bounded
/// average time between consecutive cart placements.
#[utoipa::path(
    get,
    path = "/api/v1/reports/operators",
    params(OperatorReportQuery),
    responses(
        (status = 200, description = "Operator stats", body = [OperatorStats]),
        (status = 400, description = "Invalid range", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn operator_report(
    State(state): State<AppState>,
    Query(query): Query<OperatorReportQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    if query.to < query.from {
        return Err(ServiceError::Validation(
            "report range end must not precede its start".into(),
        ));
    }
    let stats = state
        .services
        .reports
        .operator_stats(query.from, query.to)
        .await?;
    Ok(Json(stats))
}

/// Zone/street occupancy heatmap over the whole floor.
#[utoipa::path(
    get,
    path = "/api/v1/reports/heatmap",
    responses(
        (status = 200, description = "Zone heatmap", body = HeatmapReport),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "reports"
)]
pub async fn heatmap_report(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.reports.heatmap().await?;
    Ok(Json(report))
}
