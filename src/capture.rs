//! Slot capture step sequencing.
//!
//! A capture is a short linear flow driving which prompt the floor client
//! shows next: determine the slot size if the slot was never confirmed,
//! collect a cart id if the workflow requires one, then collect the
//! occupancy level and persist. There are no cycles and no coordination
//! between concurrent captures of the same code; the last completed capture
//! wins.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::SlotSize;
use crate::errors::ServiceError;

/// Current prompt of a capture flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStep {
    /// Choose one of Pequeño/Mediano/Grande.
    Size,
    /// Supply a non-empty cart id.
    CartInput,
    /// Choose the occupancy level; completing persists.
    Status,
}

/// What the sequencer needs to know about an already-stored slot.
#[derive(Debug, Clone)]
pub struct ExistingSlot {
    pub size: SlotSize,
    pub quantity: i32,
    pub is_scanned_once: bool,
}

/// One in-flight capture. Entry state depends only on whether the slot was
/// already confirmed (`is_scanned_once`): confirmed slots skip straight to
/// the occupancy prompt, carrying their stored quantity as `old_quantity`.
#[derive(Debug, Clone)]
pub struct CaptureFlow {
    pub slot_code: String,
    pub step: CaptureStep,
    pub size: Option<SlotSize>,
    pub cart_required: bool,
    pub cart_id: Option<String>,
    pub old_quantity: i32,
}

impl CaptureFlow {
    pub fn begin(
        slot_code: String,
        existing: Option<&ExistingSlot>,
        cart_required: bool,
        cart_id: Option<String>,
    ) -> Self {
        let cart_id = cart_id.and_then(normalize_cart);
        match existing {
            Some(slot) if slot.is_scanned_once => Self {
                slot_code,
                step: CaptureStep::Status,
                size: Some(slot.size),
                cart_required,
                cart_id,
                old_quantity: slot.quantity,
            },
            _ => Self {
                slot_code,
                step: CaptureStep::Size,
                size: None,
                cart_required,
                cart_id,
                old_quantity: 0,
            },
        }
    }

    /// `size → status`, or `size → cart_input` when a cart id is still owed.
    pub fn select_size(&mut self, size: SlotSize) -> Result<CaptureStep, ServiceError> {
        if self.step != CaptureStep::Size {
            return Err(ServiceError::InvalidOperation(format!(
                "capture for {} is not waiting for a size",
                self.slot_code
            )));
        }
        self.size = Some(size);
        self.step = if self.cart_required && self.cart_id.is_none() {
            CaptureStep::CartInput
        } else {
            CaptureStep::Status
        };
        Ok(self.step)
    }

    /// Records a non-empty cart id and advances to the occupancy prompt.
    pub fn provide_cart(&mut self, cart_id: &str) -> Result<CaptureStep, ServiceError> {
        let cart = normalize_cart(cart_id.to_string())
            .ok_or_else(|| ServiceError::Validation("cart id must not be empty".into()))?;
        if self.step != CaptureStep::CartInput && self.step != CaptureStep::Status {
            return Err(ServiceError::InvalidOperation(format!(
                "capture for {} is not waiting for a cart id",
                self.slot_code
            )));
        }
        self.cart_id = Some(cart);
        self.step = CaptureStep::Status;
        Ok(self.step)
    }

    /// Validates that the terminal persist may run.
    pub fn ready_to_complete(&self) -> Result<SlotSize, ServiceError> {
        if self.step != CaptureStep::Status {
            return Err(ServiceError::InvalidOperation(format!(
                "capture for {} has not reached the occupancy step",
                self.slot_code
            )));
        }
        if self.cart_required && self.cart_id.is_none() {
            return Err(ServiceError::InvalidOperation(format!(
                "capture for {} still requires a cart id",
                self.slot_code
            )));
        }
        self.size.ok_or_else(|| {
            ServiceError::InvalidOperation(format!(
                "capture for {} has no size selected",
                self.slot_code
            ))
        })
    }
}

fn normalize_cart(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

struct FlowEntry {
    flow: CaptureFlow,
    started_at: DateTime<Utc>,
}

/// In-memory registry of in-flight captures, keyed by capture id.
pub struct CaptureRegistry {
    flows: DashMap<Uuid, FlowEntry>,
}

impl Default for CaptureRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self {
            flows: DashMap::new(),
        }
    }

    pub fn insert(&self, flow: CaptureFlow) -> Uuid {
        let id = Uuid::new_v4();
        self.flows.insert(
            id,
            FlowEntry {
                flow,
                started_at: Utc::now(),
            },
        );
        id
    }

    pub fn get(&self, id: Uuid) -> Result<CaptureFlow, ServiceError> {
        self.flows
            .get(&id)
            .map(|e| e.flow.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("capture {id} not found")))
    }

    pub fn with_mut<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut CaptureFlow) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut entry = self
            .flows
            .get_mut(&id)
            .ok_or_else(|| ServiceError::NotFound(format!("capture {id} not found")))?;
        f(&mut entry.flow)
    }

    pub fn remove(&self, id: Uuid) -> Option<CaptureFlow> {
        self.flows.remove(&id).map(|(_, e)| e.flow)
    }

    /// Drops captures older than `max_age_secs`. Called opportunistically
    /// when a new capture begins; abandoned flows are never completed and
    /// would otherwise pin their entries forever.
    pub fn evict_stale(&self, max_age_secs: i64) {
        let cutoff = Utc::now() - chrono::Duration::seconds(max_age_secs);
        self.flows.retain(|_, e| e.started_at > cutoff);
    }
}
