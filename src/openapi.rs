use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Floorscan API",
        version = "0.3.0",
        description = r#"
# Floorscan Warehouse Capture API

Backend for the warehouse-floor data-capture app: barcode scan confirmation,
step-by-step slot captures, occupancy reporting and floor notifications.

## Identity

Operators are authenticated upstream; requests carry the operator email in
the `X-Operator-Email` header, which is resolved against the profile table.
Admin-only and expedition-only route groups reject other roles.

## Pagination

List endpoints accept `page` (default 1) and `limit` (default 20).
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "scanning", description = "Scan-session confidence filtering"),
        (name = "captures", description = "Slot capture flows"),
        (name = "slots", description = "Slot state and bulk import"),
        (name = "movements", description = "Capture audit trail"),
        (name = "reports", description = "Operator and occupancy reports"),
        (name = "profiles", description = "Operator profiles"),
        (name = "expeditions", description = "Dock loading records"),
        (name = "supplies", description = "Consumable supply counters"),
        (name = "tasks", description = "Operator task modes")
    ),
    paths(
        crate::handlers::scan_sessions::open_session,
        crate::handlers::scan_sessions::observe,
        crate::handlers::scan_sessions::close_session,
        crate::handlers::captures::begin_capture,
        crate::handlers::captures::select_size,
        crate::handlers::captures::provide_cart,
        crate::handlers::captures::complete_capture,
        crate::handlers::slots::list_slots,
        crate::handlers::slots::get_slot,
        crate::handlers::slots::find_available,
        crate::handlers::slots::upsert_slot,
        crate::handlers::slots::delete_slot,
        crate::handlers::slots::import_slots,
        crate::handlers::movements::list_movements,
        crate::handlers::reports::operator_report,
        crate::handlers::reports::heatmap_report,
        crate::handlers::profiles::list_profiles,
        crate::handlers::profiles::get_me,
        crate::handlers::profiles::create_profile,
        crate::handlers::profiles::update_profile,
        crate::handlers::expeditions::list_expeditions,
        crate::handlers::expeditions::open_expedition,
        crate::handlers::expeditions::complete_expedition,
        crate::handlers::supplies::list_supplies,
        crate::handlers::supplies::low_supplies,
        crate::handlers::supplies::create_supply,
        crate::handlers::supplies::adjust_supply,
        crate::handlers::supplies::supply_logs,
        crate::handlers::tasks::list_tasks,
        crate::handlers::tasks::create_task,
        crate::handlers::tasks::start_task,
        crate::handlers::tasks::finish_task,
        crate::handlers::tasks::active_task,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::scanner::Detection,
            crate::capture::CaptureStep,
            crate::domain::SlotSize,
            crate::domain::Role,
            crate::handlers::captures::BeginCaptureRequest,
            crate::handlers::captures::CaptureView,
            crate::handlers::captures::CaptureCompleted,
            crate::handlers::slots::UpsertSlotRequest,
            crate::services::imports::ImportSummary,
            crate::services::reports::OperatorStats,
            crate::services::reports::HeatmapReport,
            crate::services::tasks::ActiveTask,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_generates() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Floorscan API"));
        assert!(json.contains("/api/v1/captures"));
    }

    #[test]
    fn entity_schemas_expose_timestamp_fields() {
        let openapi = ApiDocV1::openapi();
        let schemas = openapi
            .components
            .as_ref()
            .expect("components present")
            .schemas
            .clone();
        assert!(schemas.contains_key("WarehouseSlot"));
        assert!(schemas.contains_key("MovementLog"));
        let slot = serde_json::to_string(&schemas["WarehouseSlot"]).unwrap();
        assert!(slot.contains("last_updated"));
    }
}
