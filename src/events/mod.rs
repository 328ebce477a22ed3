//! In-process domain events.
//!
//! Services push events into an mpsc pipeline; the processor logs them and
//! fans them out on a broadcast channel feeding the `/realtime/events` SSE
//! stream. Consumers treat a notification as "re-fetch now", never as an
//! incremental diff.

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};
use uuid::Uuid;

/// Domain events emitted by the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SlotUpdated {
        code: String,
        old_quantity: i32,
        new_quantity: i32,
    },
    SlotsImported {
        created: usize,
        overwritten: usize,
    },
    MovementLogged {
        id: Uuid,
        slot_code: String,
        operator_email: String,
    },
    ExpeditionOpened {
        id: Uuid,
        dock_id: String,
        side: String,
    },
    ExpeditionCompleted {
        id: Uuid,
        dock_id: String,
        side: String,
    },
    SupplyAdjusted {
        id: Uuid,
        name: String,
        change_amount: i32,
        new_quantity: i32,
    },
    TaskStarted {
        log_id: Uuid,
        task_name: String,
        operator_email: String,
    },
    TaskFinished {
        log_id: Uuid,
        task_name: String,
        operator_email: String,
    },
}

impl Event {
    /// Stable event name used as the SSE event type.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SlotUpdated { .. } => "slot_updated",
            Event::SlotsImported { .. } => "slots_imported",
            Event::MovementLogged { .. } => "movement_logged",
            Event::ExpeditionOpened { .. } => "expedition_opened",
            Event::ExpeditionCompleted { .. } => "expedition_completed",
            Event::SupplyAdjusted { .. } => "supply_adjusted",
            Event::TaskStarted { .. } => "task_started",
            Event::TaskFinished { .. } => "task_finished",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously. Event delivery is best-effort; a full
    /// or closed channel is reported but must never fail the operation that
    /// produced the event.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {e}"))
    }
}

/// Consumes the event pipeline, logging each event and forwarding it to the
/// realtime broadcast. Runs until the sender side is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>, realtime: broadcast::Sender<Event>) {
    info!("event processor started");
    while let Some(event) = rx.recv().await {
        debug!(kind = event.kind(), "processing event");
        // No subscribers is fine; the SSE stream may not be open.
        let _ = realtime.send(event);
    }
    info!("event processor stopped");
}
