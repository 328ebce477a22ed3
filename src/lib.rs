//! Floorscan API Library
//!
//! This crate provides the core functionality for the Floorscan warehouse
//! data-capture API: scan confirmation, capture flows, slot state, reports
//! and floor notifications.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod capture;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod scanner;
pub mod services;

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;
use utoipa::ToSchema;

use crate::auth::RoleRouterExt;
use crate::domain::Role;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
    pub realtime: broadcast::Sender<events::Event>,
}

// Defaults shared by the per-resource list query structs
pub fn default_page() -> u64 {
    1
}
pub fn default_limit() -> u64 {
    20
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, limit: u64) -> Self {
        let limit = limit.max(1);
        Self {
            items,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// All versioned API routes, grouped by the capability they require.
pub fn api_v1_routes() -> Router<AppState> {
    // Scanning and captures: any resolved operator
    let scanning = Router::new()
        .route(
            "/scan-sessions",
            post(handlers::scan_sessions::open_session),
        )
        .route(
            "/scan-sessions/{id}/detections",
            post(handlers::scan_sessions::observe),
        )
        .route(
            "/scan-sessions/{id}",
            delete(handlers::scan_sessions::close_session),
        )
        .with_identity();

    let captures = Router::new()
        .route("/captures", post(handlers::captures::begin_capture))
        .route("/captures/{id}", get(handlers::captures::get_capture))
        .route("/captures/{id}", delete(handlers::captures::cancel_capture))
        .route("/captures/{id}/size", post(handlers::captures::select_size))
        .route("/captures/{id}/cart", post(handlers::captures::provide_cart))
        .route(
            "/captures/{id}/complete",
            post(handlers::captures::complete_capture),
        )
        .route(
            "/captures/{id}/announcement",
            get(handlers::captures::get_announcement),
        )
        .with_identity();

    // Slot reads are open to any operator; direct mutation is admin-only
    let slots_read = Router::new()
        .route("/slots", get(handlers::slots::list_slots))
        .route(
            "/slots/find-available",
            get(handlers::slots::find_available),
        )
        .route("/slots/{code}", get(handlers::slots::get_slot))
        .with_identity();

    let slots_admin = Router::new()
        .route("/slots/{code}", put(handlers::slots::upsert_slot))
        .route("/slots/{code}", delete(handlers::slots::delete_slot))
        .route("/slots/import", post(handlers::slots::import_slots))
        .with_role(Role::Admin);

    let movements = Router::new()
        .route("/movements", get(handlers::movements::list_movements))
        .with_identity();

    let reports = Router::new()
        .route("/reports/operators", get(handlers::reports::operator_report))
        .route("/reports/heatmap", get(handlers::reports::heatmap_report))
        .with_role(Role::Admin);

    let profiles_self = Router::new()
        .route("/profiles/me", get(handlers::profiles::get_me))
        .with_identity();

    let profiles_admin = Router::new()
        .route("/profiles", get(handlers::profiles::list_profiles))
        .route("/profiles", post(handlers::profiles::create_profile))
        .route("/profiles/{id}", put(handlers::profiles::update_profile))
        .with_role(Role::Admin);

    let expeditions_read = Router::new()
        .route("/expeditions", get(handlers::expeditions::list_expeditions))
        .with_identity();

    let expeditions_write = Router::new()
        .route("/expeditions", post(handlers::expeditions::open_expedition))
        .route(
            "/expeditions/{id}/complete",
            post(handlers::expeditions::complete_expedition),
        )
        .with_role(Role::Expedition);

    let supplies = Router::new()
        .route("/supplies", get(handlers::supplies::list_supplies))
        .route("/supplies/low", get(handlers::supplies::low_supplies))
        .route("/supplies/{id}/logs", get(handlers::supplies::supply_logs))
        .route("/supplies/{id}/adjust", post(handlers::supplies::adjust_supply))
        .with_identity();

    let supplies_admin = Router::new()
        .route("/supplies", post(handlers::supplies::create_supply))
        .with_role(Role::Admin);

    let tasks = Router::new()
        .route("/tasks", get(handlers::tasks::list_tasks))
        .route("/tasks/active", get(handlers::tasks::active_task))
        .route("/tasks/start", post(handlers::tasks::start_task))
        .route("/tasks/finish", post(handlers::tasks::finish_task))
        .with_identity();

    let tasks_admin = Router::new()
        .route("/tasks", post(handlers::tasks::create_task))
        .with_role(Role::Admin);

    let realtime = Router::new()
        .route("/realtime/events", get(handlers::realtime::events))
        .with_identity();

    Router::new()
        .merge(scanning)
        .merge(captures)
        .merge(slots_read)
        .merge(slots_admin)
        .merge(movements)
        .merge(reports)
        .merge(profiles_self)
        .merge(profiles_admin)
        .merge(expeditions_read)
        .merge(expeditions_write)
        .merge(supplies)
        .merge(supplies_admin)
        .merge(tasks)
        .merge(tasks_admin)
        .merge(realtime)
}

/// Full application router: versioned API, health probes and the identity
/// resolution middleware. Observability layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_v1_routes())
        .route("/health", get(health_check))
        .route("/status", get(api_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::identity_middleware,
        ))
        .with_state(state)
}

async fn api_status() -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "floorscan-api",
        "timestamp": Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };
    let health_data = json!({
        "status": db_status,
        "database": db_status,
        "timestamp": Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginated_response_computes_total_pages() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 41, 1, 20);
        assert_eq!(page.total_pages, 3);
        let page = PaginatedResponse::new(Vec::<i32>::new(), 0, 1, 20);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn api_response_success_carries_data() {
        let ok = ApiResponse::success("ok");
        assert!(ok.success);
        assert_eq!(ok.data, Some("ok"));

        let err = ApiResponse::<()>::error("oops".into());
        assert!(!err.success);
        assert_eq!(err.message.as_deref(), Some("oops"));
    }
}
