use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::expedition_log::{self, Entity as ExpeditionLog};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

const SIDES: &[&str] = &["left", "right", "single"];

/// Dock loading flow. One open (status "loading") record per dock+side at a
/// time, enforced here rather than left to the client.
#[derive(Clone)]
pub struct ExpeditionService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ExpeditionService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        status: Option<&str>,
    ) -> Result<(Vec<expedition_log::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut query = ExpeditionLog::find().order_by_desc(expedition_log::Column::StartedAt);
        if let Some(status) = status {
            query = query.filter(expedition_log::Column::Status.eq(status));
        }
        let paginator = query.paginate(db, limit.max(1));
        let total = paginator.num_items().await?;
        let logs = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((logs, total))
    }

    /// Opens a loading record for a dock side. Conflicts when a loading
    /// record is already open for the same dock+side.
    #[instrument(skip(self))]
    pub async fn open(
        &self,
        dock_id: &str,
        side: &str,
        truck_id: &str,
    ) -> Result<expedition_log::Model, ServiceError> {
        let db = &*self.db_pool;
        let side = side.to_lowercase();
        if !SIDES.contains(&side.as_str()) {
            return Err(ServiceError::Validation(format!(
                "side must be one of left/right/single, got {side}"
            )));
        }
        if truck_id.trim().is_empty() {
            return Err(ServiceError::Validation("truck id must not be empty".into()));
        }

        let open = ExpeditionLog::find()
            .filter(expedition_log::Column::DockId.eq(dock_id))
            .filter(expedition_log::Column::Side.eq(side.as_str()))
            .filter(expedition_log::Column::Status.eq("loading"))
            .one(db)
            .await?;
        if open.is_some() {
            return Err(ServiceError::Conflict(format!(
                "dock {dock_id} side {side} already has an open loading record"
            )));
        }

        let log = expedition_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            dock_id: Set(dock_id.to_string()),
            side: Set(side.clone()),
            truck_id: Set(truck_id.trim().to_string()),
            status: Set("loading".to_string()),
            started_at: Set(Utc::now()),
            finished_at: Set(None),
        }
        .insert(db)
        .await?;

        let _ = self
            .event_sender
            .send(Event::ExpeditionOpened {
                id: log.id,
                dock_id: log.dock_id.clone(),
                side: log.side.clone(),
            })
            .await;
        Ok(log)
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, id: Uuid) -> Result<expedition_log::Model, ServiceError> {
        let db = &*self.db_pool;
        let log = ExpeditionLog::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("expedition {id} not found")))?;

        if log.status != "loading" {
            return Err(ServiceError::InvalidOperation(format!(
                "expedition {id} is not loading"
            )));
        }

        let mut active: expedition_log::ActiveModel = log.into();
        active.status = Set("completed".to_string());
        active.finished_at = Set(Some(Utc::now()));
        let log = active.update(db).await?;

        let _ = self
            .event_sender
            .send(Event::ExpeditionCompleted {
                id: log.id,
                dock_id: log.dock_id.clone(),
                side: log.side.clone(),
            })
            .await;
        Ok(log)
    }
}
