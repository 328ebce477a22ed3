pub mod captures;
pub mod expeditions;
pub mod movements;
pub mod profiles;
pub mod realtime;
pub mod reports;
pub mod scan_sessions;
pub mod slots;
pub mod supplies;
pub mod tasks;

use std::sync::Arc;

use crate::capture::CaptureRegistry;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::scanner::ScanSessionRegistry;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub slots: Arc<crate::services::slots::SlotService>,
    pub movements: Arc<crate::services::movements::MovementService>,
    pub profiles: Arc<crate::services::profiles::ProfileService>,
    pub expeditions: Arc<crate::services::expeditions::ExpeditionService>,
    pub supplies: Arc<crate::services::supplies::SupplyService>,
    pub tasks: Arc<crate::services::tasks::TaskService>,
    pub reports: Arc<crate::services::reports::ReportService>,
    pub imports: Arc<crate::services::imports::ImportService>,
    pub captures: Arc<crate::services::captures::CaptureService>,
    pub scan_sessions: Arc<ScanSessionRegistry>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, cfg: &AppConfig) -> Self {
        let slots = Arc::new(crate::services::slots::SlotService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let movements = Arc::new(crate::services::movements::MovementService::new(
            db_pool.clone(),
        ));
        let profiles = Arc::new(crate::services::profiles::ProfileService::new(
            db_pool.clone(),
        ));
        let expeditions = Arc::new(crate::services::expeditions::ExpeditionService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let supplies = Arc::new(crate::services::supplies::SupplyService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let tasks = Arc::new(crate::services::tasks::TaskService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let reports = Arc::new(crate::services::reports::ReportService::new(
            movements.clone(),
            profiles.clone(),
            slots.clone(),
        ));
        let imports = Arc::new(crate::services::imports::ImportService::new(
            db_pool,
            event_sender,
        ));
        let speech = Arc::new(crate::services::speech::SpeechService::new(cfg));
        let captures = Arc::new(crate::services::captures::CaptureService::new(
            Arc::new(CaptureRegistry::new()),
            slots.clone(),
            speech,
        ));

        Self {
            slots,
            movements,
            profiles,
            expeditions,
            supplies,
            tasks,
            reports,
            imports,
            captures,
            scan_sessions: Arc::new(ScanSessionRegistry::new()),
        }
    }
}
