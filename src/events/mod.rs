use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

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
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event after a commit; a closed channel must not fail the request.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(err) = self.send(event).await {
            warn!(error = %err, "dropping domain event");
        }
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // Checkout events
    CouponApplied {
        session_id: Uuid,
        code: String,
        discount: Decimal,
    },
    CouponRemoved {
        session_id: Uuid,
    },

    // Order events
    OrderPlaced {
        order_id: Uuid,
        user_id: Uuid,
        payment_method: String,
        final_amount: Decimal,
    },
    OrderStatusChanged {
        order_id: Uuid,
        from: String,
        to: String,
    },
    CancellationRequested {
        order_id: Uuid,
        request_id: Uuid,
    },
    CancellationRejected {
        order_id: Uuid,
        request_id: Uuid,
    },
    OrderCancelled {
        order_id: Uuid,
        refunded_amount: Decimal,
    },

    // Payment events
    PaymentCaptured {
        order_id: Uuid,
        payment_id: Uuid,
    },

    // Return events
    ReturnRequested {
        return_id: Uuid,
        order_id: Uuid,
    },
    ReturnApproved(Uuid),
    ReturnRejected(Uuid),
    RefundIssued {
        return_id: Uuid,
        order_id: Uuid,
        amount: Decimal,
    },
    ReturnedToSeller(Uuid),

    // Wallet events
    WalletCredited {
        user_id: Uuid,
        amount: Decimal,
        balance: Decimal,
    },
    WalletDebited {
        user_id: Uuid,
        amount: Decimal,
        balance: Decimal,
    },
}

pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderPlaced {
                order_id,
                payment_method,
                final_amount,
                ..
            } => {
                info!(%order_id, %payment_method, %final_amount, "order placed");
            }
            Event::OrderCancelled {
                order_id,
                refunded_amount,
            } => {
                info!(%order_id, %refunded_amount, "order cancelled");
            }
            Event::RefundIssued {
                return_id, amount, ..
            } => {
                info!(%return_id, %amount, "refund issued to wallet");
            }
            Event::PaymentCaptured {
                order_id,
                payment_id,
            } => {
                info!(%order_id, %payment_id, "payment captured");
            }
            _ => {
                info!(event = ?event, "domain event");
            }
        }
    }

    warn!("Event processing loop has ended");
}
