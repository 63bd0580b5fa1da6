use crate::{
    db::UnitOfWork,
    entities::{
        order,
        payment::{self, PaymentStatus},
    },
    errors::{OrderError, PaymentError, ServiceError},
    events::{Event, EventSender},
    repositories::{OrderRepository, PaymentRepository},
    services::{
        order_status::{transition, OrderEvent},
        payment_gateway::PaymentGateway,
    },
};
use chrono::Utc;
use metrics::counter;
use sea_orm::{DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

/// Callback payload the client relays after paying on the gateway page.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GatewayCallbackInput {
    #[validate(length(min = 1, max = 128))]
    pub gateway_order_id: String,
    #[validate(length(min = 1, max = 128))]
    pub gateway_payment_id: String,
    #[validate(length(min = 1, max = 256))]
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapturedPayment {
    pub payment: payment::Model,
    pub order: order::Model,
}

#[derive(Clone)]
pub struct PaymentService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            db,
            event_sender,
            gateway,
        }
    }

    /// Verifies a gateway callback and, if genuine, marks the payment paid
    /// and confirms the order. A bad signature changes nothing.
    #[instrument(skip(self, input), fields(gateway_order_id = %input.gateway_order_id))]
    pub async fn verify_and_update_gateway_payment(
        &self,
        user_id: Uuid,
        input: GatewayCallbackInput,
    ) -> Result<CapturedPayment, ServiceError> {
        let payment = PaymentRepository::find_by_gateway_order_id(&*self.db, &input.gateway_order_id)
            .await?
            .ok_or(PaymentError::PaymentNotFound)?;
        if payment.user_id != user_id {
            return Err(OrderError::Unauthorized.into());
        }

        if let Err(err) = self.gateway.verify_signature(
            &input.gateway_order_id,
            &input.gateway_payment_id,
            &input.signature,
        ) {
            counter!("storefront.payments.signature_rejected", 1);
            warn!(payment_id = %payment.id, "gateway signature rejected");
            return Err(err.into());
        }

        let uow = UnitOfWork::begin(&self.db, "capture_gateway_payment").await?;
        let result: Result<CapturedPayment, ServiceError> = async {
            let conn = uow.conn();
            // Re-read inside the transaction; a concurrent callback may have won.
            let payment = PaymentRepository::find_by_gateway_order_id(conn, &input.gateway_order_id)
                .await?
                .ok_or(PaymentError::PaymentNotFound)?;
            match payment.status {
                PaymentStatus::AwaitingPayment => {}
                PaymentStatus::Paid | PaymentStatus::Refunded => {
                    return Err(PaymentError::PaymentAlreadyCaptured.into())
                }
                PaymentStatus::Cancelled => return Err(OrderError::OrderAlreadyCancelled.into()),
                PaymentStatus::Pending => {
                    return Err(ServiceError::ValidationError(
                        "payment is not awaiting a gateway capture".to_string(),
                    ))
                }
            }

            let order = OrderRepository::find_by_id(conn, payment.order_id)
                .await?
                .ok_or(OrderError::OrderNotFound)?;
            let next = transition(order.order_status, OrderEvent::Confirm)?;

            let mut paid: payment::ActiveModel = payment.into();
            paid.status = Set(PaymentStatus::Paid);
            paid.gateway_payment_id = Set(Some(input.gateway_payment_id.clone()));
            paid.gateway_signature = Set(Some(input.signature.clone()));
            paid.paid_at = Set(Some(Utc::now()));
            let payment = PaymentRepository::update(conn, paid).await?;

            let mut confirmed: order::ActiveModel = order.into();
            confirmed.order_status = Set(next);
            let order = OrderRepository::update(conn, confirmed).await?;

            Ok(CapturedPayment { payment, order })
        }
        .await;
        let captured = uow.finish(result).await?;

        counter!("storefront.payments.captured", 1);
        info!(order_id = %captured.order.id, payment_id = %captured.payment.id, "gateway payment captured");
        self.event_sender
            .send_or_log(Event::PaymentCaptured {
                order_id: captured.order.id,
                payment_id: captured.payment.id,
            })
            .await;
        Ok(captured)
    }
}
