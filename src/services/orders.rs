//! Order placement and order-level queries.
//!
//! Both payment paths share [`OrderService::place_order`]: everything from
//! reading the checkout session to clearing the cart happens in one
//! `UnitOfWork`, so a failure at any step leaves no order, payment, item or
//! stock change behind.

use crate::{
    config::CommerceConfig,
    db::UnitOfWork,
    entities::{
        commerce::checkout_session::{self, CheckoutStatus},
        order::{self, DeliveryStatus, OrderStatus},
        order_item,
        payment::{self, PaymentMethod, PaymentStatus},
    },
    errors::{CheckoutError, OrderError, PaymentError, ServiceError},
    events::{Event, EventSender},
    repositories::{
        AddressRepository, CartRepository, CheckoutRepository, OrderRepository, PaymentRepository,
    },
    services::{
        commerce::checkout_service::{load_checkout_lines, totals_of, CheckoutLine},
        inventory::{InventoryGuard, StockLine},
        order_status::{transition, OrderEvent},
        payment_gateway::PaymentGateway,
    },
};
use chrono::Utc;
use metrics::counter;
use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use sea_orm::{ConnectionTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlaceOrderInput {
    pub checkout_session_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// An order with everything it owns.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
    pub payment: Option<payment::Model>,
}

/// Converts a major-unit amount into the gateway's minor units.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    gateway: Arc<dyn PaymentGateway>,
    commerce: CommerceConfig,
}

impl OrderService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        gateway: Arc<dyn PaymentGateway>,
        commerce: CommerceConfig,
    ) -> Self {
        Self {
            db,
            event_sender,
            gateway,
            commerce,
        }
    }

    /// Places a cash-on-delivery order; the payment stays `pending` until delivery.
    #[instrument(skip(self))]
    pub async fn place_order_cod(
        &self,
        user_id: Uuid,
        checkout_session_id: Uuid,
    ) -> Result<OrderDetails, ServiceError> {
        self.place_order(user_id, checkout_session_id, PaymentMethod::Cod)
            .await
    }

    /// Places a gateway order; the payment waits for the signed callback.
    #[instrument(skip(self))]
    pub async fn place_order_gateway(
        &self,
        user_id: Uuid,
        checkout_session_id: Uuid,
    ) -> Result<OrderDetails, ServiceError> {
        self.place_order(user_id, checkout_session_id, PaymentMethod::Gateway)
            .await
    }

    async fn place_order(
        &self,
        user_id: Uuid,
        checkout_session_id: Uuid,
        method: PaymentMethod,
    ) -> Result<OrderDetails, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "place_order").await?;
        let result = self
            .place_order_in(uow.conn(), user_id, checkout_session_id, method)
            .await;
        let details = match uow.finish(result).await {
            Ok(details) => details,
            Err(err) => {
                counter!("storefront.orders.placement_failed", 1, "method" => method.to_string());
                return Err(err);
            }
        };

        counter!("storefront.orders.placed", 1, "method" => method.to_string());
        info!(
            order_id = %details.order.id,
            %user_id,
            payment_method = %method,
            final_amount = %details.order.final_amount,
            "order placed"
        );
        self.event_sender
            .send_or_log(Event::OrderPlaced {
                order_id: details.order.id,
                user_id,
                payment_method: method.to_string(),
                final_amount: details.order.final_amount,
            })
            .await;
        Ok(details)
    }

    async fn place_order_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        checkout_session_id: Uuid,
        method: PaymentMethod,
    ) -> Result<OrderDetails, ServiceError> {
        let session = CheckoutRepository::find_by_id(conn, checkout_session_id)
            .await?
            .ok_or(CheckoutError::SessionNotFound)?;
        if session.user_id != user_id {
            return Err(OrderError::Unauthorized.into());
        }
        if !session.is_pending() {
            return Err(OrderError::OrderAlreadyPlaced.into());
        }

        let lines = load_checkout_lines(conn, user_id).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }
        let totals = totals_of(&lines);
        if totals.item_count != session.item_count || totals.total_amount != session.total_amount {
            return Err(CheckoutError::CartUpdatedAfterCreatingCheckoutSession.into());
        }

        let stock: Vec<StockLine> = lines.iter().map(CheckoutLine::stock_line).collect();
        InventoryGuard::validate_stock(conn, &stock).await?;

        let shipping_address_id = session.shipping_address_id.ok_or(OrderError::InvalidAddress)?;
        AddressRepository::find_shipping_address(conn, shipping_address_id)
            .await?
            .ok_or(OrderError::InvalidAddress)?;

        if method == PaymentMethod::Cod && session.final_amount > self.commerce.cod_max_order_amount {
            return Err(OrderError::CodLimitExceeded {
                limit: self.commerce.cod_max_order_amount,
            }
            .into());
        }

        let now = Utc::now();
        let order = OrderRepository::create(
            conn,
            order::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                checkout_session_id: Set(session.id),
                total_amount: Set(session.total_amount),
                discount_amount: Set(session.discount_amount),
                final_amount: Set(session.final_amount),
                coupon_code: Set(session.coupon_code.clone()),
                coupon_applied: Set(session.coupon_applied),
                order_status: Set(OrderStatus::PendingPayment),
                delivery_status: Set(DeliveryStatus::Pending),
                refund_status: Set(None),
                payment_method: Set(method),
                shipping_address_id: Set(shipping_address_id),
                has_return_request: Set(false),
                is_cancelled: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
                delivered_at: Set(None),
            },
        )
        .await?;

        let payment = self.create_payment(conn, &order, method).await?;

        let items = OrderRepository::insert_items(
            conn,
            order.id,
            lines
                .iter()
                .map(|line| order_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    order_id: Set(order.id),
                    product_id: Set(line.product_id),
                    quantity: Set(line.quantity),
                    price: Set(line.unit_price),
                    created_at: Set(now),
                })
                .collect(),
        )
        .await?;

        InventoryGuard::decrement(conn, &stock).await?;

        let mut completed: checkout_session::ActiveModel = session.into();
        completed.status = Set(CheckoutStatus::Completed);
        CheckoutRepository::update(conn, completed).await?;
        CartRepository::clear(conn, user_id).await?;

        Ok(OrderDetails {
            order,
            items,
            payment: Some(payment),
        })
    }

    async fn create_payment<C: ConnectionTrait>(
        &self,
        conn: &C,
        order: &order::Model,
        method: PaymentMethod,
    ) -> Result<payment::Model, ServiceError> {
        let (status, gateway_order_id) = match method {
            PaymentMethod::Cod => (PaymentStatus::Pending, None),
            PaymentMethod::Gateway => {
                let amount_minor = to_minor_units(order.final_amount).ok_or_else(|| {
                    PaymentError::GatewayOrderCreation("amount out of range".to_string())
                })?;
                let remote_id = self
                    .gateway
                    .create_remote_order(amount_minor, &self.commerce.currency, &order.id.to_string())
                    .await
                    .map_err(|e| {
                        warn!(order_id = %order.id, error = %e, "gateway order creation failed");
                        e
                    })?;
                (PaymentStatus::AwaitingPayment, Some(remote_id))
            }
        };

        let now = Utc::now();
        PaymentRepository::create(
            conn,
            payment::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                user_id: Set(order.user_id),
                amount: Set(order.final_amount),
                currency: Set(self.commerce.currency.clone()),
                payment_method: Set(method),
                status: Set(status),
                gateway_order_id: Set(gateway_order_id),
                gateway_payment_id: Set(None),
                gateway_signature: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                paid_at: Set(None),
            },
        )
        .await
    }

    /// Loads an order for its owner.
    #[instrument(skip(self))]
    pub async fn get_order(&self, user_id: Uuid, order_id: Uuid) -> Result<OrderDetails, ServiceError> {
        let details = self.get_order_details(order_id).await?;
        if details.order.user_id != user_id {
            return Err(OrderError::Unauthorized.into());
        }
        Ok(details)
    }

    /// Loads an order regardless of owner (admin views).
    pub async fn get_order_details(&self, order_id: Uuid) -> Result<OrderDetails, ServiceError> {
        let conn = &*self.db;
        let order = OrderRepository::find_by_id(conn, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;
        let items = OrderRepository::find_items(conn, order_id).await?;
        let payment = PaymentRepository::find_by_order(conn, order_id).await?;
        Ok(OrderDetails {
            order,
            items,
            payment,
        })
    }

    pub async fn list_orders(
        &self,
        user_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        OrderRepository::list_by_user(&*self.db, user_id, page, per_page).await
    }

    pub async fn list_all_orders(
        &self,
        status: Option<OrderStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        OrderRepository::list_by_status(&*self.db, status, page, per_page).await
    }

    /// Admin progression: confirm, process, ship, deliver.
    ///
    /// Delivery stamps `delivered_at` and settles a COD payment as paid.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        target: OrderStatus,
    ) -> Result<order::Model, ServiceError> {
        let event = match target {
            OrderStatus::Confirmed => OrderEvent::Confirm,
            OrderStatus::Processing => OrderEvent::StartProcessing,
            OrderStatus::Shipped => OrderEvent::Ship,
            OrderStatus::Delivered => OrderEvent::Deliver,
            other => {
                return Err(ServiceError::ValidationError(format!(
                    "status {} cannot be set directly",
                    other
                )))
            }
        };

        let uow = UnitOfWork::begin(&self.db, "update_order_status").await?;
        let result: Result<(order::Model, OrderStatus), ServiceError> = async {
            let conn = uow.conn();
            let order = OrderRepository::find_by_id(conn, order_id)
                .await?
                .ok_or(OrderError::OrderNotFound)?;
            let from = order.order_status;
            let next = transition(from, event)?;
            let now = Utc::now();

            let mut active: order::ActiveModel = order.clone().into();
            active.order_status = Set(next);
            match next {
                OrderStatus::Shipped => active.delivery_status = Set(DeliveryStatus::Shipped),
                OrderStatus::Delivered => {
                    active.delivery_status = Set(DeliveryStatus::Delivered);
                    active.delivered_at = Set(Some(now));
                }
                _ => {}
            }
            let updated = OrderRepository::update(conn, active).await?;

            if next == OrderStatus::Delivered && order.payment_method == PaymentMethod::Cod {
                if let Some(payment) = PaymentRepository::find_by_order(conn, order_id).await? {
                    if payment.status == PaymentStatus::Pending {
                        let mut paid: payment::ActiveModel = payment.into();
                        paid.status = Set(PaymentStatus::Paid);
                        paid.paid_at = Set(Some(now));
                        PaymentRepository::update(conn, paid).await?;
                    }
                }
            }
            Ok((updated, from))
        }
        .await;
        let (order, from) = uow.finish(result).await?;

        info!(%order_id, from = %from, to = %order.order_status, "order status updated");
        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id,
                from: from.to_string(),
                to: order.order_status.to_string(),
            })
            .await;
        Ok(order)
    }
}
