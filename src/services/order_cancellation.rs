//! User and admin cancellation.
//!
//! A user may cancel an unpaid order outright. Once the order is confirmed
//! or processing, the user only files a request; an admin then approves it
//! (order cancelled, stock restored, captured money refunded to the wallet)
//! or rejects it (order returns to its previous status).

use crate::{
    db::UnitOfWork,
    entities::{
        cancellation_request::{self, CancellationStatus},
        order::{self, DeliveryStatus, OrderStatus, RefundStatus},
        payment::{self, PaymentStatus},
        wallet_transaction::WalletTransactionType,
    },
    errors::{OrderError, ServiceError},
    events::{Event, EventSender},
    repositories::{OrderRepository, PaymentRepository},
    services::{
        inventory::{InventoryGuard, StockLine},
        order_status::{transition, OrderEvent},
        wallet::{LedgerReference, WalletEntry, WalletService},
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CancelOrderInput {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CancellationOutcome {
    pub order: order::Model,
    /// Present when the cancellation awaits (or went through) admin review
    pub request: Option<cancellation_request::Model>,
    pub refunded_amount: Decimal,
}

enum UserCancellation {
    Immediate(Finalized),
    Requested(order::Model, cancellation_request::Model),
}

/// What finalizing a cancellation did, for post-commit events.
struct Finalized {
    order: order::Model,
    request: Option<cancellation_request::Model>,
    refund: Option<WalletEntry>,
}

#[derive(Clone)]
pub struct OrderCancellationService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl OrderCancellationService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// User-initiated cancellation.
    #[instrument(skip(self, input))]
    pub async fn cancel_order(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        input: CancelOrderInput,
    ) -> Result<CancellationOutcome, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "cancel_order").await?;
        let result: Result<UserCancellation, ServiceError> = async {
            let conn = uow.conn();
            let order = OrderRepository::find_by_id(conn, order_id)
                .await?
                .ok_or(OrderError::OrderNotFound)?;
            if order.user_id != user_id {
                return Err(OrderError::Unauthorized.into());
            }

            let previous = order.order_status;
            match transition(previous, OrderEvent::UserCancel)? {
                OrderStatus::Cancelled => {
                    let finalized = Self::finalize_cancellation(conn, order, None).await?;
                    Ok(UserCancellation::Immediate(finalized))
                }
                next => {
                    let request = OrderRepository::create_cancellation_request(
                        conn,
                        cancellation_request::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            order_id: Set(order.id),
                            user_id: Set(user_id),
                            reason: Set(input.reason.clone()),
                            status: Set(CancellationStatus::PendingReview),
                            previous_status: Set(previous),
                            is_stock_updated: Set(false),
                            created_at: Set(Utc::now()),
                            reviewed_at: Set(None),
                        },
                    )
                    .await?;
                    let mut active: order::ActiveModel = order.into();
                    active.order_status = Set(next);
                    let order = OrderRepository::update(conn, active).await?;
                    Ok(UserCancellation::Requested(order, request))
                }
            }
        }
        .await;

        match uow.finish(result).await? {
            UserCancellation::Immediate(finalized) => Ok(self.publish_cancelled(finalized).await),
            UserCancellation::Requested(order, request) => {
                info!(%order_id, request_id = %request.id, "cancellation awaiting review");
                self.event_sender
                    .send_or_log(Event::CancellationRequested {
                        order_id,
                        request_id: request.id,
                    })
                    .await;
                Ok(CancellationOutcome {
                    order,
                    request: Some(request),
                    refunded_amount: Decimal::ZERO,
                })
            }
        }
    }

    /// Admin approval of a pending cancellation request.
    #[instrument(skip(self))]
    pub async fn approve_cancellation(&self, order_id: Uuid) -> Result<CancellationOutcome, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "approve_cancellation").await?;
        let result: Result<Finalized, ServiceError> = async {
            let conn = uow.conn();
            let order = OrderRepository::find_by_id(conn, order_id)
                .await?
                .ok_or(OrderError::OrderNotFound)?;
            transition(order.order_status, OrderEvent::ApproveCancellation)?;
            let request = OrderRepository::find_pending_cancellation(conn, order_id)
                .await?
                .ok_or(OrderError::CancellationRequestNotFound)?;
            Self::finalize_cancellation(conn, order, Some(request)).await
        }
        .await;
        let finalized = uow.finish(result).await?;
        Ok(self.publish_cancelled(finalized).await)
    }

    /// Admin rejection: the order goes back to where it was.
    #[instrument(skip(self))]
    pub async fn reject_cancellation(&self, order_id: Uuid) -> Result<CancellationOutcome, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "reject_cancellation").await?;
        let result: Result<(order::Model, cancellation_request::Model), ServiceError> = async {
            let conn = uow.conn();
            let order = OrderRepository::find_by_id(conn, order_id)
                .await?
                .ok_or(OrderError::OrderNotFound)?;
            // Same precondition as approval.
            transition(order.order_status, OrderEvent::ApproveCancellation)?;
            let request = OrderRepository::find_pending_cancellation(conn, order_id)
                .await?
                .ok_or(OrderError::CancellationRequestNotFound)?;
            let restored = transition(
                order.order_status,
                OrderEvent::RejectCancellation(request.previous_status),
            )?;

            let mut active: order::ActiveModel = order.into();
            active.order_status = Set(restored);
            let order = OrderRepository::update(conn, active).await?;

            let mut reviewed: cancellation_request::ActiveModel = request.into();
            reviewed.status = Set(CancellationStatus::Rejected);
            reviewed.reviewed_at = Set(Some(Utc::now()));
            let request = OrderRepository::update_cancellation_request(conn, reviewed).await?;
            Ok((order, request))
        }
        .await;
        let (order, request) = uow.finish(result).await?;

        info!(%order_id, restored = %order.order_status, "cancellation rejected");
        self.event_sender
            .send_or_log(Event::CancellationRejected {
                order_id,
                request_id: request.id,
            })
            .await;
        Ok(CancellationOutcome {
            order,
            request: Some(request),
            refunded_amount: Decimal::ZERO,
        })
    }

    /// Admin cancellation without a review step. A request still pending for
    /// the order is closed as approved.
    #[instrument(skip(self))]
    pub async fn admin_cancel_order(&self, order_id: Uuid) -> Result<CancellationOutcome, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "admin_cancel_order").await?;
        let result: Result<Finalized, ServiceError> = async {
            let conn = uow.conn();
            let order = OrderRepository::find_by_id(conn, order_id)
                .await?
                .ok_or(OrderError::OrderNotFound)?;
            transition(order.order_status, OrderEvent::AdminCancel)?;
            let request = OrderRepository::find_pending_cancellation(conn, order_id).await?;
            Self::finalize_cancellation(conn, order, request).await
        }
        .await;
        let finalized = uow.finish(result).await?;
        Ok(self.publish_cancelled(finalized).await)
    }

    pub async fn list_pending_requests(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<cancellation_request::Model>, u64), ServiceError> {
        OrderRepository::list_pending_cancellations(&*self.db, page, per_page).await
    }

    /// Cancels `order`: restores stock once, settles the payment and closes
    /// the review request if there is one. Callers have already checked the
    /// transition is legal.
    async fn finalize_cancellation<C: ConnectionTrait>(
        conn: &C,
        order: order::Model,
        request: Option<cancellation_request::Model>,
    ) -> Result<Finalized, ServiceError> {
        let now = Utc::now();

        if !request.as_ref().map_or(false, |r| r.is_stock_updated) {
            let items = OrderRepository::find_items(conn, order.id).await?;
            let lines: Vec<StockLine> = items
                .iter()
                .map(|i| StockLine::new(i.product_id, i.quantity))
                .collect();
            InventoryGuard::restore(conn, &lines).await?;
        }

        let mut refund = None;
        if let Some(payment) = PaymentRepository::find_by_order(conn, order.id).await? {
            if payment.is_refundable_gateway_capture() {
                refund = Some(
                    WalletService::credit_in(
                        conn,
                        order.user_id,
                        payment.amount,
                        WalletTransactionType::Refund,
                        Some(LedgerReference::order(order.id)),
                        Some("Refund for cancelled order".to_string()),
                    )
                    .await?,
                );
                let mut refunded: payment::ActiveModel = payment.into();
                refunded.status = Set(PaymentStatus::Refunded);
                PaymentRepository::update(conn, refunded).await?;
            } else if matches!(
                payment.status,
                PaymentStatus::Pending | PaymentStatus::AwaitingPayment
            ) {
                let mut voided: payment::ActiveModel = payment.into();
                voided.status = Set(PaymentStatus::Cancelled);
                PaymentRepository::update(conn, voided).await?;
            }
        }

        let request = match request {
            Some(request) => {
                let mut approved: cancellation_request::ActiveModel = request.into();
                approved.status = Set(CancellationStatus::Approved);
                approved.is_stock_updated = Set(true);
                approved.reviewed_at = Set(Some(now));
                Some(OrderRepository::update_cancellation_request(conn, approved).await?)
            }
            None => None,
        };

        let mut active: order::ActiveModel = order.into();
        active.order_status = Set(OrderStatus::Cancelled);
        active.delivery_status = Set(DeliveryStatus::Cancelled);
        active.is_cancelled = Set(true);
        if refund.is_some() {
            active.refund_status = Set(Some(RefundStatus::Completed));
        }
        let order = OrderRepository::update(conn, active).await?;

        Ok(Finalized {
            order,
            request,
            refund,
        })
    }

    async fn publish_cancelled(&self, finalized: Finalized) -> CancellationOutcome {
        let Finalized {
            order,
            request,
            refund,
        } = finalized;
        let refunded_amount = refund
            .as_ref()
            .map_or(Decimal::ZERO, |entry| entry.transaction.amount);

        info!(order_id = %order.id, %refunded_amount, "order cancelled");
        if let Some(entry) = &refund {
            self.event_sender
                .send_or_log(Event::WalletCredited {
                    user_id: entry.user_id,
                    amount: entry.transaction.amount,
                    balance: entry.balance,
                })
                .await;
        }
        self.event_sender
            .send_or_log(Event::OrderCancelled {
                order_id: order.id,
                refunded_amount,
            })
            .await;

        CancellationOutcome {
            order,
            request,
            refunded_amount,
        }
    }
}
