use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use sea_orm::sea_query::Expr;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::warehouse_supply::{self, Entity as WarehouseSupply};
use crate::entities::warehouse_supply_log;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Consumable supply counters plus their audit log.
#[derive(Clone)]
pub struct SupplyService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl SupplyService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<warehouse_supply::Model>, ServiceError> {
        let db = &*self.db_pool;
        let supplies = WarehouseSupply::find()
            .order_by_asc(warehouse_supply::Column::Name)
            .all(db)
            .await?;
        Ok(supplies)
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        name: &str,
        quantity: i32,
        min_quantity: i32,
        unit: &str,
    ) -> Result<warehouse_supply::Model, ServiceError> {
        let db = &*self.db_pool;
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("supply name must not be empty".into()));
        }
        if quantity < 0 || min_quantity < 0 {
            return Err(ServiceError::Validation(
                "quantities must not be negative".into(),
            ));
        }

        let supply = warehouse_supply::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            quantity: Set(quantity),
            min_quantity: Set(min_quantity),
            unit: Set(unit.trim().to_string()),
            updated_at: Set(Utc::now()),
        }
        .insert(db)
        .await?;
        Ok(supply)
    }

    /// Applies a signed change to a supply counter and appends an audit log
    /// row, in one transaction. The counter may not go negative.
    #[instrument(skip(self))]
    pub async fn adjust(
        &self,
        id: Uuid,
        change_amount: i32,
        comment: Option<String>,
        operator_email: &str,
    ) -> Result<warehouse_supply::Model, ServiceError> {
        if change_amount == 0 {
            return Err(ServiceError::Validation("change amount must not be zero".into()));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await?;

        let supply = WarehouseSupply::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("supply {id} not found")))?;

        let new_quantity = supply.quantity + change_amount;
        if new_quantity < 0 {
            return Err(ServiceError::InvalidOperation(format!(
                "supply {} only has {} left",
                supply.name, supply.quantity
            )));
        }

        let name = supply.name.clone();
        let mut active: warehouse_supply::ActiveModel = supply.into();
        active.quantity = Set(new_quantity);
        active.updated_at = Set(Utc::now());
        let supply = active.update(&txn).await?;

        warehouse_supply_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            supply_id: Set(id),
            change_amount: Set(change_amount),
            comment: Set(comment),
            operator_email: Set(operator_email.to_string()),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        let _ = self
            .event_sender
            .send(Event::SupplyAdjusted {
                id,
                name,
                change_amount,
                new_quantity,
            })
            .await;
        Ok(supply)
    }

    /// Supplies at or below their minimum level.
    #[instrument(skip(self))]
    pub async fn low(&self) -> Result<Vec<warehouse_supply::Model>, ServiceError> {
        let db = &*self.db_pool;
        let supplies = WarehouseSupply::find()
            .filter(
                Condition::all().add(
                    Expr::col(warehouse_supply::Column::Quantity)
                        .lte(Expr::col(warehouse_supply::Column::MinQuantity)),
                ),
            )
            .order_by_asc(warehouse_supply::Column::Name)
            .all(db)
            .await?;
        Ok(supplies)
    }

    #[instrument(skip(self))]
    pub async fn logs(
        &self,
        supply_id: Uuid,
    ) -> Result<Vec<warehouse_supply_log::Model>, ServiceError> {
        let db = &*self.db_pool;
        let logs = warehouse_supply_log::Entity::find()
            .filter(warehouse_supply_log::Column::SupplyId.eq(supply_id))
            .order_by_desc(warehouse_supply_log::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(logs)
    }
}
