use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::{Occupancy, SlotSize};
use crate::entities::warehouse_slot::{self, Entity as WarehouseSlot};
use crate::entities::movement_log;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Service for warehouse slot rows and the capture persist path.
#[derive(Clone)]
pub struct SlotService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

/// Terminal persist input for a completed capture.
#[derive(Debug, Clone)]
pub struct RecordCapture {
    pub slot_code: String,
    pub size: SlotSize,
    pub quantity: Occupancy,
    pub operator_name: String,
    pub operator_email: String,
    pub cart_id: Option<String>,
}

impl SlotService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_by_code(
        &self,
        code: &str,
    ) -> Result<Option<warehouse_slot::Model>, ServiceError> {
        let db = &*self.db_pool;
        let slot = WarehouseSlot::find()
            .filter(warehouse_slot::Column::Code.eq(code))
            .one(db)
            .await?;
        Ok(slot)
    }

    /// Lists slots ordered by code, optionally filtered by a case-insensitive
    /// code fragment and/or a zone prefix.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        search: Option<&str>,
        zone: Option<&str>,
    ) -> Result<(Vec<warehouse_slot::Model>, u64), ServiceError> {
        let db = &*self.db_pool;

        let mut query = WarehouseSlot::find().order_by_asc(warehouse_slot::Column::Code);
        if let Some(fragment) = search {
            query = query.filter(warehouse_slot::Column::Code.contains(&fragment.to_uppercase()));
        }
        if let Some(zone) = zone {
            query = query.filter(warehouse_slot::Column::Code.starts_with(&zone.to_uppercase()));
        }

        let paginator = query.paginate(db, limit.max(1));
        let total = paginator.num_items().await?;
        let slots = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((slots, total))
    }

    /// First slot with spare capacity, smallest code first. Drives the
    /// "find available slot" workflow, which then runs a capture with a cart
    /// id requirement.
    #[instrument(skip(self))]
    pub async fn find_available(
        &self,
        size: Option<SlotSize>,
    ) -> Result<Option<warehouse_slot::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = WarehouseSlot::find()
            .filter(warehouse_slot::Column::Quantity.lt(Occupancy::Full.as_i32()))
            .order_by_asc(warehouse_slot::Column::Code);
        if let Some(size) = size {
            query = query.filter(warehouse_slot::Column::Size.eq(size.to_string()));
        }
        Ok(query.one(db).await?)
    }

    /// Upserts a slot row keyed on `code`. Last write wins; no concurrency
    /// token is used.
    #[instrument(skip(self))]
    pub async fn upsert(
        &self,
        code: &str,
        size: &str,
        status: &str,
        quantity: i32,
        is_scanned_once: bool,
    ) -> Result<warehouse_slot::Model, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();

        let model = warehouse_slot::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_uppercase()),
            status: Set(status.to_string()),
            size: Set(size.to_string()),
            quantity: Set(quantity),
            is_scanned_once: Set(is_scanned_once),
            last_updated: Set(now),
            created_at: Set(now),
        };

        WarehouseSlot::insert(model)
            .on_conflict(
                OnConflict::column(warehouse_slot::Column::Code)
                    .update_columns([
                        warehouse_slot::Column::Status,
                        warehouse_slot::Column::Size,
                        warehouse_slot::Column::Quantity,
                        warehouse_slot::Column::IsScannedOnce,
                        warehouse_slot::Column::LastUpdated,
                    ])
                    .to_owned(),
            )
            .exec(db)
            .await?;

        self.get_by_code(code).await?.ok_or_else(|| {
            ServiceError::Internal(format!("slot {code} missing after upsert"))
        })
    }

    /// Persists a completed capture: upserts the slot state and appends one
    /// movement-log row recording the occupancy transition, in a single
    /// transaction.
    #[instrument(skip(self, input), fields(slot_code = %input.slot_code))]
    pub async fn record_capture(
        &self,
        input: RecordCapture,
    ) -> Result<(warehouse_slot::Model, movement_log::Model), ServiceError> {
        let db = &*self.db_pool;
        let code = input.slot_code.to_uppercase();
        let new_quantity = input.quantity.as_i32();
        let now = Utc::now();

        let txn = db.begin().await?;

        let existing = WarehouseSlot::find()
            .filter(warehouse_slot::Column::Code.eq(code.as_str()))
            .one(&txn)
            .await?;
        let old_quantity = existing.as_ref().map(|s| s.quantity).unwrap_or(0);

        let slot = match existing {
            Some(slot) => {
                let mut active: warehouse_slot::ActiveModel = slot.into();
                active.status = Set(input.quantity.status_label().to_string());
                active.size = Set(input.size.to_string());
                active.quantity = Set(new_quantity);
                active.is_scanned_once = Set(true);
                active.last_updated = Set(now);
                active.update(&txn).await?
            }
            None => {
                warehouse_slot::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    code: Set(code.clone()),
                    status: Set(input.quantity.status_label().to_string()),
                    size: Set(input.size.to_string()),
                    quantity: Set(new_quantity),
                    is_scanned_once: Set(true),
                    last_updated: Set(now),
                    created_at: Set(now),
                }
                .insert(&txn)
                .await?
            }
        };

        let log = movement_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            operator_name: Set(input.operator_name),
            operator_email: Set(input.operator_email),
            cart_id: Set(input.cart_id),
            slot_code: Set(code.clone()),
            old_quantity: Set(old_quantity),
            new_quantity: Set(new_quantity),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        let _ = self
            .event_sender
            .send(Event::SlotUpdated {
                code: code.clone(),
                old_quantity,
                new_quantity,
            })
            .await;
        let _ = self
            .event_sender
            .send(Event::MovementLogged {
                id: log.id,
                slot_code: code,
                operator_email: log.operator_email.clone(),
            })
            .await;

        Ok((slot, log))
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, code: &str) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = WarehouseSlot::delete_many()
            .filter(warehouse_slot::Column::Code.eq(code.to_uppercase()))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("slot {code} not found")));
        }
        Ok(())
    }
}
