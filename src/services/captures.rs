use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::capture::{CaptureFlow, CaptureRegistry, CaptureStep, ExistingSlot};
use crate::domain::{Occupancy, SlotSize};
use crate::entities::{movement_log, warehouse_slot};
use crate::errors::ServiceError;
use crate::services::slots::{RecordCapture, SlotService};
use crate::services::speech::SpeechService;

/// Abandoned flows are dropped after this long without completing.
const CAPTURE_MAX_AGE_SECS: i64 = 30 * 60;

/// Orchestrates capture flows: entry-state lookup, step transitions, the
/// terminal persist, and the spoken cart announcement.
#[derive(Clone)]
pub struct CaptureService {
    registry: Arc<CaptureRegistry>,
    slots: Arc<SlotService>,
    speech: Arc<SpeechService>,
}

impl CaptureService {
    pub fn new(
        registry: Arc<CaptureRegistry>,
        slots: Arc<SlotService>,
        speech: Arc<SpeechService>,
    ) -> Self {
        Self {
            registry,
            slots,
            speech,
        }
    }

    /// Starts a capture for a scanned or typed slot code. Entry state
    /// depends on whether the stored slot was already confirmed.
    #[instrument(skip(self))]
    pub async fn begin(
        &self,
        slot_code: &str,
        cart_required: bool,
        cart_id: Option<String>,
    ) -> Result<(Uuid, CaptureFlow), ServiceError> {
        self.registry.evict_stale(CAPTURE_MAX_AGE_SECS);

        let code = slot_code.trim().to_uppercase();
        if code.is_empty() {
            return Err(ServiceError::Validation("slot code must not be empty".into()));
        }

        let existing = self.slots.get_by_code(&code).await?.map(|slot| ExistingSlot {
            size: SlotSize::parse_or_default(&slot.size),
            quantity: slot.quantity,
            is_scanned_once: slot.is_scanned_once,
        });

        let flow = CaptureFlow::begin(code, existing.as_ref(), cart_required, cart_id);
        let id = self.registry.insert(flow.clone());
        Ok((id, flow))
    }

    pub fn get(&self, id: Uuid) -> Result<CaptureFlow, ServiceError> {
        self.registry.get(id)
    }

    pub fn select_size(&self, id: Uuid, size: SlotSize) -> Result<CaptureFlow, ServiceError> {
        self.registry.with_mut(id, |flow| {
            flow.select_size(size)?;
            Ok(flow.clone())
        })
    }

    pub fn provide_cart(&self, id: Uuid, cart_id: &str) -> Result<CaptureFlow, ServiceError> {
        self.registry.with_mut(id, |flow| {
            flow.provide_cart(cart_id)?;
            Ok(flow.clone())
        })
    }

    pub fn cancel(&self, id: Uuid) -> Result<(), ServiceError> {
        self.registry
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::NotFound(format!("capture {id} not found")))
    }

    /// Runs the terminal persist for a capture that reached the occupancy
    /// step, then kicks off the cart announcement in the background.
    #[instrument(skip(self))]
    pub async fn complete(
        &self,
        id: Uuid,
        quantity: Occupancy,
        operator_name: &str,
        operator_email: &str,
    ) -> Result<(warehouse_slot::Model, movement_log::Model), ServiceError> {
        let flow = self.registry.get(id)?;
        let size = flow.ready_to_complete()?;

        let (slot, log) = self
            .slots
            .record_capture(RecordCapture {
                slot_code: flow.slot_code.clone(),
                size,
                quantity,
                operator_name: operator_name.to_string(),
                operator_email: operator_email.to_string(),
                cart_id: flow.cart_id.clone(),
            })
            .await?;

        // The flow is spent only after the persist succeeded.
        self.registry.remove(id);

        if let Some(cart_id) = flow.cart_id {
            if self.speech.enabled() {
                let speech = self.speech.clone();
                let operator = operator_name.to_string();
                tokio::spawn(async move {
                    speech.announce(id, &operator, &cart_id).await;
                });
            }
        }

        Ok((slot, log))
    }

    pub fn take_announcement(&self, id: Uuid) -> Option<Vec<u8>> {
        self.speech.take_announcement(id)
    }
}
