use crate::{entities::RequestStatus, errors::ServiceError};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), ServiceError> {
        self.sender
            .send(event)
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))
    }

    /// Sends an event after a committed write. A closed channel must not fail
    /// the operation that already succeeded, so errors are only logged.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Dropping domain event");
        }
    }
}

/// Domain events emitted after a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    UsageRecorded {
        usage_id: i32,
        supply_id: i32,
        quantity_used: i32,
        remaining: i32,
        department: String,
    },
    RequestCreated {
        request_id: i32,
        supply_id: i32,
        quantity: i32,
    },
    RequestStatusChanged {
        request_id: i32,
        old_status: RequestStatus,
        new_status: RequestStatus,
    },
    StockCredited {
        supply_id: i32,
        request_id: i32,
        quantity: i32,
    },
    LowStockReached {
        supply_id: i32,
        quantity: i32,
        min_quantity: i32,
    },
}

/// Creates the event channel with the given buffer size.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::UsageRecorded {
                usage_id,
                supply_id,
                quantity_used,
                remaining,
                department,
            } => {
                info!(
                    usage_id,
                    supply_id, quantity_used, remaining, %department, "Usage recorded"
                );
            }
            Event::RequestCreated {
                request_id,
                supply_id,
                quantity,
            } => {
                info!(request_id, supply_id, quantity, "Supply request created");
            }
            Event::RequestStatusChanged {
                request_id,
                old_status,
                new_status,
            } => {
                info!(
                    request_id,
                    %old_status,
                    %new_status,
                    "Supply request status changed"
                );
            }
            Event::StockCredited {
                supply_id,
                request_id,
                quantity,
            } => {
                info!(supply_id, request_id, quantity, "Stock credited from request");
            }
            Event::LowStockReached {
                supply_id,
                quantity,
                min_quantity,
            } => {
                warn!(supply_id, quantity, min_quantity, "Supply at or below minimum stock");
            }
        }
    }

    info!("Event processing loop stopped");
}

/// Waits for the event worker to finish the events still queued.
///
/// The worker only stops once every [`EventSender`] is dropped, so callers
/// drop their senders first. Returns `false` if `grace` ran out and the
/// worker was aborted.
pub async fn drain(worker: JoinHandle<()>, grace: Duration) -> bool {
    let abort = worker.abort_handle();
    match tokio::time::timeout(grace, worker).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(error = %e, "Event worker ended abnormally");
            false
        }
        Err(_) => {
            warn!(?grace, "Event worker did not drain in time; aborting");
            abort.abort();
            false
        }
    }
}
