//! Post-delivery returns and wallet refunds.

use crate::{
    db::UnitOfWork,
    entities::{
        order::{self, OrderStatus, RefundStatus},
        payment::{self, PaymentStatus},
        return_request,
        wallet_transaction::WalletTransactionType,
    },
    errors::{OrderError, ReturnError, ServiceError},
    events::{Event, EventSender},
    repositories::{OrderRepository, PaymentRepository, ReturnRepository},
    services::{
        inventory::{InventoryGuard, StockLine},
        order_status::{transition, OrderEvent},
        wallet::{LedgerReference, WalletEntry, WalletService},
    },
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InitiateReturnInput {
    pub order_id: Uuid,
    #[validate(length(max = 1000))]
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnDecisionInput {
    pub approve: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundOutcome {
    pub return_request: return_request::Model,
    pub order: order::Model,
    pub wallet_balance: rust_decimal::Decimal,
}

/// A return is allowed strictly before `delivered_at + window`.
pub fn within_return_window(delivered_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    now < delivered_at + window
}

#[derive(Clone)]
pub struct ReturnService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    return_window: Duration,
}

impl ReturnService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        return_window_days: i64,
    ) -> Self {
        Self {
            db,
            event_sender,
            return_window: Duration::days(return_window_days),
        }
    }

    #[instrument(skip(self, input), fields(order_id = %input.order_id))]
    pub async fn initiate_return(
        &self,
        user_id: Uuid,
        input: InitiateReturnInput,
    ) -> Result<return_request::Model, ServiceError> {
        self.initiate_return_at(user_id, input, Utc::now()).await
    }

    /// [`Self::initiate_return`] evaluated at `now`.
    pub async fn initiate_return_at(
        &self,
        user_id: Uuid,
        input: InitiateReturnInput,
        now: DateTime<Utc>,
    ) -> Result<return_request::Model, ServiceError> {
        let order_id = input.order_id;
        let window = self.return_window;

        let uow = UnitOfWork::begin(&self.db, "initiate_return").await?;
        let result: Result<return_request::Model, ServiceError> = async {
            let conn = uow.conn();
            let order = OrderRepository::find_by_id(conn, order_id)
                .await?
                .ok_or(OrderError::OrderNotFound)?;
            if order.user_id != user_id {
                return Err(OrderError::Unauthorized.into());
            }
            if order.is_cancelled {
                return Err(ReturnError::OrderCancelled.into());
            }
            if order.has_return_request
                || ReturnRepository::find_by_order(conn, order_id).await?.is_some()
            {
                return Err(ReturnError::ReturnAlreadyRequested.into());
            }
            let delivered_at = match (order.order_status, order.delivered_at) {
                (OrderStatus::Delivered, Some(at)) => at,
                _ => return Err(ReturnError::OrderNotDelivered.into()),
            };
            if !within_return_window(delivered_at, now, window) {
                return Err(ReturnError::ReturnWindowExpired.into());
            }
            let reason = input.reason.trim();
            if reason.is_empty() {
                return Err(ReturnError::InvalidReturnReason.into());
            }

            let next = transition(order.order_status, OrderEvent::RequestReturn)?;
            let request = ReturnRepository::create(
                conn,
                return_request::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    order_id: Set(order.id),
                    user_id: Set(user_id),
                    reason: Set(reason.to_string()),
                    requested_date: Set(now),
                    approved_at: Set(None),
                    rejected_at: Set(None),
                    refund_initiated: Set(false),
                    refund_amount: Set(None),
                    refund_completed: Set(false),
                    is_order_reached_seller: Set(false),
                    returned_to_seller_at: Set(None),
                    is_stock_updated: Set(false),
                    updated_at: Set(now),
                },
            )
            .await?;

            let mut active: order::ActiveModel = order.into();
            active.has_return_request = Set(true);
            active.order_status = Set(next);
            OrderRepository::update(conn, active).await?;
            Ok(request)
        }
        .await;
        let request = uow.finish(result).await?;

        info!(return_id = %request.id, %order_id, "return requested");
        self.event_sender
            .send_or_log(Event::ReturnRequested {
                return_id: request.id,
                order_id,
            })
            .await;
        Ok(request)
    }

    /// Approves or rejects a return exactly once.
    #[instrument(skip(self))]
    pub async fn update_return_request(
        &self,
        return_id: Uuid,
        approve: bool,
    ) -> Result<return_request::Model, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "update_return_request").await?;
        let result: Result<return_request::Model, ServiceError> = async {
            let conn = uow.conn();
            let request = ReturnRepository::find_by_id(conn, return_id)
                .await?
                .ok_or(ReturnError::ReturnRequestNotFound)?;
            if request.is_processed() {
                return Err(ReturnError::ReturnRequestAlreadyProcessed.into());
            }
            let order = OrderRepository::find_by_id(conn, request.order_id)
                .await?
                .ok_or(OrderError::OrderNotFound)?;
            let event = if approve {
                OrderEvent::ApproveReturn
            } else {
                OrderEvent::RejectReturn
            };
            let next = transition(order.order_status, event)?;

            let now = Utc::now();
            let mut decided: return_request::ActiveModel = request.into();
            if approve {
                decided.approved_at = Set(Some(now));
            } else {
                decided.rejected_at = Set(Some(now));
            }
            let request = ReturnRepository::update(conn, decided).await?;

            let mut active: order::ActiveModel = order.into();
            active.order_status = Set(next);
            OrderRepository::update(conn, active).await?;
            Ok(request)
        }
        .await;
        let request = uow.finish(result).await?;

        info!(%return_id, approve, "return request decided");
        let event = if approve {
            Event::ReturnApproved(return_id)
        } else {
            Event::ReturnRejected(return_id)
        };
        self.event_sender.send_or_log(event).await;
        Ok(request)
    }

    /// Credits the order's final amount to the user's wallet.
    #[instrument(skip(self))]
    pub async fn initiate_refund(&self, return_id: Uuid) -> Result<RefundOutcome, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "initiate_refund").await?;
        let result: Result<(RefundOutcome, WalletEntry), ServiceError> = async {
            let conn = uow.conn();
            let request = ReturnRepository::find_by_id(conn, return_id)
                .await?
                .ok_or(ReturnError::ReturnRequestNotFound)?;
            if !request.is_approved() {
                return Err(ReturnError::ReturnNotApproved.into());
            }
            if request.refund_initiated {
                return Err(ReturnError::RefundAlreadyInitiated.into());
            }
            let order = OrderRepository::find_by_id(conn, request.order_id)
                .await?
                .ok_or(OrderError::OrderNotFound)?;
            if order.is_cancelled || order.order_status == OrderStatus::Cancelled {
                return Err(ReturnError::OrderCancelled.into());
            }
            let next = transition(order.order_status, OrderEvent::Refund)?;

            let amount = order.final_amount;
            let entry = WalletService::credit_in(
                conn,
                order.user_id,
                amount,
                WalletTransactionType::Refund,
                Some(LedgerReference::return_request(request.id)),
                Some("Refund for returned order".to_string()),
            )
            .await?;

            let mut refunded: return_request::ActiveModel = request.into();
            refunded.refund_initiated = Set(true);
            refunded.refund_amount = Set(Some(amount));
            refunded.refund_completed = Set(true);
            let return_request = ReturnRepository::update(conn, refunded).await?;

            if let Some(payment) = PaymentRepository::find_by_order(conn, order.id).await? {
                if payment.status == PaymentStatus::Paid {
                    let mut active: payment::ActiveModel = payment.into();
                    active.status = Set(PaymentStatus::Refunded);
                    PaymentRepository::update(conn, active).await?;
                }
            }

            let mut active: order::ActiveModel = order.into();
            active.order_status = Set(next);
            active.refund_status = Set(Some(RefundStatus::Completed));
            let order = OrderRepository::update(conn, active).await?;

            let outcome = RefundOutcome {
                return_request,
                order,
                wallet_balance: entry.balance,
            };
            Ok((outcome, entry))
        }
        .await;
        let (outcome, entry) = uow.finish(result).await?;

        info!(%return_id, amount = %entry.transaction.amount, "refund credited to wallet");
        self.event_sender
            .send_or_log(Event::WalletCredited {
                user_id: entry.user_id,
                amount: entry.transaction.amount,
                balance: entry.balance,
            })
            .await;
        self.event_sender
            .send_or_log(Event::RefundIssued {
                return_id,
                order_id: outcome.order.id,
                amount: entry.transaction.amount,
            })
            .await;
        Ok(outcome)
    }

    /// Records that the parcel reached the seller and puts the stock back.
    #[instrument(skip(self))]
    pub async fn mark_returned_to_seller(
        &self,
        return_id: Uuid,
    ) -> Result<return_request::Model, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "mark_returned_to_seller").await?;
        let result: Result<return_request::Model, ServiceError> = async {
            let conn = uow.conn();
            let request = ReturnRepository::find_by_id(conn, return_id)
                .await?
                .ok_or(ReturnError::ReturnRequestNotFound)?;
            if !request.is_approved() {
                return Err(ReturnError::ReturnNotApproved.into());
            }
            if request.is_order_reached_seller {
                return Err(ReturnError::AlreadyMarkedAsReturned.into());
            }

            if !request.is_stock_updated {
                let items = OrderRepository::find_items(conn, request.order_id).await?;
                let lines: Vec<StockLine> = items
                    .iter()
                    .map(|i| StockLine::new(i.product_id, i.quantity))
                    .collect();
                InventoryGuard::restore(conn, &lines).await?;
            }

            let mut received: return_request::ActiveModel = request.into();
            received.is_order_reached_seller = Set(true);
            received.returned_to_seller_at = Set(Some(Utc::now()));
            received.is_stock_updated = Set(true);
            ReturnRepository::update(conn, received).await
        }
        .await;
        let request = uow.finish(result).await?;

        info!(%return_id, "return received by seller");
        self.event_sender
            .send_or_log(Event::ReturnedToSeller(return_id))
            .await;
        Ok(request)
    }

    /// Owners see their own returns; admins see any.
    pub async fn get_return(
        &self,
        user_id: Uuid,
        is_admin: bool,
        return_id: Uuid,
    ) -> Result<return_request::Model, ServiceError> {
        let request = ReturnRepository::find_by_id(&*self.db, return_id)
            .await?
            .ok_or(ReturnError::ReturnRequestNotFound)?;
        if !is_admin && request.user_id != user_id {
            return Err(OrderError::Unauthorized.into());
        }
        Ok(request)
    }

    pub async fn list_returns(
        &self,
        user_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<return_request::Model>, u64), ServiceError> {
        ReturnRepository::list(&*self.db, user_id, page, per_page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_boundary_is_exclusive() {
        let delivered = Utc::now();
        let window = Duration::days(14);

        assert!(within_return_window(delivered, delivered, window));
        assert!(within_return_window(
            delivered,
            delivered + window - Duration::seconds(1),
            window
        ));
        assert!(!within_return_window(delivered, delivered + window, window));
        assert!(!within_return_window(
            delivered,
            delivered + window + Duration::days(1),
            window
        ));
    }
}
