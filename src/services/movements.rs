use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use tracing::instrument;

use crate::db::DbPool;
use crate::entities::movement_log::{self, Entity as MovementLog};
use crate::errors::ServiceError;

/// Read side of the movement audit trail. Rows are written only by the
/// capture persist path; there is no update or delete.
#[derive(Clone)]
pub struct MovementService {
    db_pool: Arc<DbPool>,
}

/// Filters for listing movement logs.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub operator_email: Option<String>,
    pub slot_code: Option<String>,
}

impl MovementService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        filter: MovementFilter,
    ) -> Result<(Vec<movement_log::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let mut query = MovementLog::find().order_by_desc(movement_log::Column::CreatedAt);
        if let Some(from) = filter.from {
            query = query.filter(movement_log::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(movement_log::Column::CreatedAt.lte(to));
        }
        if let Some(email) = filter.operator_email {
            query = query.filter(movement_log::Column::OperatorEmail.eq(email));
        }
        if let Some(code) = filter.slot_code {
            query = query.filter(movement_log::Column::SlotCode.eq(code.to_uppercase()));
        }

        let paginator = query.paginate(db, limit.max(1));
        let total = paginator.num_items().await?;
        let logs = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((logs, total))
    }

    /// All logs inside a date range, ascending by time. Used by the report
    /// aggregation, which needs consecutive-row deltas.
    #[instrument(skip(self))]
    pub async fn find_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<movement_log::Model>, ServiceError> {
        let db = &*self.db_pool;
        let logs = MovementLog::find()
            .filter(movement_log::Column::CreatedAt.gte(from))
            .filter(movement_log::Column::CreatedAt.lte(to))
            .order_by_asc(movement_log::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(logs)
    }
}
