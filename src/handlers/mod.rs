pub mod commerce;
pub mod common;
pub mod orders;
pub mod payments;
pub mod returns;
pub mod wallet;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    commerce::{CartService, CheckoutService, CouponService},
    order_cancellation::OrderCancellationService,
    orders::OrderService,
    payment_gateway::PaymentGateway,
    payments::PaymentService,
    returns::ReturnService,
    wallet::WalletService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub cart: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
    pub coupons: Arc<CouponService>,
    pub orders: Arc<OrderService>,
    pub cancellations: Arc<OrderCancellationService>,
    pub payments: Arc<PaymentService>,
    pub returns: Arc<ReturnService>,
    pub wallet: Arc<WalletService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        gateway: Arc<dyn PaymentGateway>,
        config: &AppConfig,
    ) -> Self {
        let commerce = config.commerce.clone();

        Self {
            cart: Arc::new(CartService::new(db_pool.clone())),
            checkout: Arc::new(CheckoutService::new(
                db_pool.clone(),
                event_sender.clone(),
                commerce.max_discount_amount,
            )),
            coupons: Arc::new(CouponService::new(db_pool.clone())),
            orders: Arc::new(OrderService::new(
                db_pool.clone(),
                event_sender.clone(),
                gateway.clone(),
                commerce.clone(),
            )),
            cancellations: Arc::new(OrderCancellationService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            payments: Arc::new(PaymentService::new(
                db_pool.clone(),
                event_sender.clone(),
                gateway,
            )),
            returns: Arc::new(ReturnService::new(
                db_pool.clone(),
                event_sender.clone(),
                commerce.return_window_days,
            )),
            wallet: Arc::new(WalletService::new(db_pool, event_sender)),
        }
    }
}
