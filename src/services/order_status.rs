//! Order lifecycle transition table.
//!
//! ```text
//! pending_payment ──confirm──▶ confirmed ──process──▶ processing ──ship──▶ shipped ──deliver──▶ delivered
//!        │                        │  └────────────┬──────┘                                         │
//!        │ user_cancel            │ user_cancel   │                                     request_return
//!        ▼                        ▼               ▼                                                ▼
//!    cancelled ◀──approve── pending_cancellation ──reject──▶ (previous)       return_requested ──▶ return_approved ──▶ refunded
//! ```
//!
//! Every use-case asks [`transition`] for the next status instead of
//! comparing status strings, so an illegal move always surfaces as a typed
//! [`OrderError`].

use strum::Display;

use crate::entities::order::OrderStatus;
use crate::errors::OrderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum OrderEvent {
    /// Payment captured by the gateway, or an admin confirming a COD order
    Confirm,
    StartProcessing,
    Ship,
    Deliver,
    UserCancel,
    ApproveCancellation,
    /// Carries the status the order had when cancellation was requested
    RejectCancellation(OrderStatus),
    AdminCancel,
    RequestReturn,
    ApproveReturn,
    RejectReturn,
    Refund,
}

/// Status that `event` moves an order in `from` to.
pub fn transition(from: OrderStatus, event: OrderEvent) -> Result<OrderStatus, OrderError> {
    use OrderEvent as E;
    use OrderStatus as S;

    let next = match (from, event) {
        (S::Cancelled, _) => return Err(OrderError::OrderAlreadyCancelled),

        (S::PendingPayment, E::Confirm) => S::Confirmed,
        (S::Confirmed, E::StartProcessing) => S::Processing,
        (S::Confirmed | S::Processing, E::Ship) => S::Shipped,
        (S::Confirmed | S::Processing | S::Shipped, E::Deliver) => S::Delivered,
        (S::Delivered, E::Confirm | E::StartProcessing | E::Ship | E::Deliver) => {
            return Err(OrderError::OrderAlreadyDelivered)
        }

        (S::PendingPayment, E::UserCancel) => S::Cancelled,
        (S::Confirmed | S::Processing, E::UserCancel) => S::PendingCancellation,
        (status, E::UserCancel) => {
            return Err(OrderError::OrderNotCancellable {
                status: status.to_string(),
            })
        }

        (S::PendingCancellation, E::ApproveCancellation) => S::Cancelled,
        (S::PendingCancellation, E::RejectCancellation(previous @ (S::Confirmed | S::Processing))) => {
            previous
        }
        (_, E::ApproveCancellation | E::RejectCancellation(_)) if from != S::PendingCancellation => {
            return Err(OrderError::OrderNotPendingCancellation)
        }

        (S::PendingPayment | S::Confirmed | S::Processing | S::PendingCancellation, E::AdminCancel) => {
            S::Cancelled
        }
        (status, E::AdminCancel) => {
            return Err(OrderError::OrderNotCancellable {
                status: status.to_string(),
            })
        }

        (S::Delivered, E::RequestReturn) => S::ReturnRequested,
        (S::ReturnRequested, E::ApproveReturn) => S::ReturnApproved,
        (S::ReturnRequested, E::RejectReturn) => S::Delivered,
        (S::ReturnApproved, E::Refund) => S::Refunded,

        (from, event) => {
            return Err(OrderError::InvalidTransition {
                from: from.to_string(),
                to: event.to_string(),
            })
        }
    };
    Ok(next)
}

/// Statuses from which a user may still cancel.
pub fn is_user_cancellable(status: OrderStatus) -> bool {
    transition(status, OrderEvent::UserCancel).is_ok()
}
