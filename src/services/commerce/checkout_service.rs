use crate::{
    db::UnitOfWork,
    entities::commerce::{
        checkout_session::{self, CheckoutStatus},
        shipping_address,
    },
    errors::{CheckoutError, CouponError, InventoryError, ServiceError},
    events::{Event, EventSender},
    repositories::{AddressRepository, CartRepository, CheckoutRepository, CouponRepository},
    services::{
        commerce::pricing_service::{compute_totals, quote_coupon, round_money, CheckoutTotals},
        inventory::{InventoryGuard, StockLine},
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

/// A cart line as checkout sees it: live product price, quantity to buy.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CheckoutLine {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

impl CheckoutLine {
    pub fn stock_line(&self) -> StockLine {
        StockLine::new(self.product_id, self.quantity)
    }
}

/// Loads the user's cart priced at current product prices.
///
/// A line whose product is gone or soft-deleted fails the whole load; the
/// user has to drop it from the cart before checking out.
pub(crate) async fn load_checkout_lines<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Vec<CheckoutLine>, ServiceError> {
    let rows = CartRepository::items_with_products(conn, user_id).await?;
    rows.into_iter()
        .map(|(item, product)| -> Result<CheckoutLine, ServiceError> {
            let product = product
                .filter(|p| p.is_available())
                .ok_or(InventoryError::ProductUnavailable(item.product_id))?;
            Ok(CheckoutLine {
                product_id: product.id,
                name: product.name,
                quantity: item.quantity,
                unit_price: product.price,
                subtotal: round_money(product.price * Decimal::from(item.quantity)),
            })
        })
        .collect()
}

pub(crate) fn totals_of(lines: &[CheckoutLine]) -> CheckoutTotals {
    compute_totals(lines.iter().map(|l| (l.quantity, l.unit_price)))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApplyCouponInput {
    #[validate(length(min = 1, max = 64))]
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetShippingAddressInput {
    pub address_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct CouponApplication {
    pub session: checkout_session::Model,
    /// Present when the discount was clamped to the configured maximum
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSummary {
    pub session: checkout_session::Model,
    pub items: Vec<CheckoutLine>,
    pub shipping_address: Option<shipping_address::Model>,
}

/// Manages the single pending checkout session each user has.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    max_discount_amount: Decimal,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        max_discount_amount: Decimal,
    ) -> Self {
        Self {
            db,
            event_sender,
            max_discount_amount,
        }
    }

    /// Returns the user's pending session, refreshed against the live cart,
    /// or opens a new one.
    #[instrument(skip(self))]
    pub async fn get_or_create_session(
        &self,
        user_id: Uuid,
    ) -> Result<checkout_session::Model, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "checkout_get_or_create").await?;
        let result: Result<checkout_session::Model, ServiceError> = async {
            let conn = uow.conn();
            let lines = load_checkout_lines(conn, user_id).await?;
            let totals = totals_of(&lines);

            match CheckoutRepository::find_pending_by_user(conn, user_id).await? {
                Some(session) => Self::refresh_from_cart(conn, session, totals).await,
                None => {
                    let session = CheckoutRepository::create(
                        conn,
                        user_id,
                        totals.total_amount,
                        totals.item_count,
                    )
                    .await?;
                    info!(%user_id, session_id = %session.id, "checkout session opened");
                    Ok(session)
                }
            }
        }
        .await;
        uow.finish(result).await
    }

    /// Re-prices `session` from `totals`. When the cart changed since the
    /// session was last priced, any applied coupon is dropped.
    pub async fn refresh_from_cart<C: ConnectionTrait>(
        conn: &C,
        session: checkout_session::Model,
        totals: CheckoutTotals,
    ) -> Result<checkout_session::Model, ServiceError> {
        if session.total_amount == totals.total_amount && session.item_count == totals.item_count {
            return Ok(session);
        }

        debug!(
            session_id = %session.id,
            coupon_cleared = session.coupon_applied,
            "cart changed, repricing checkout session"
        );
        let mut active: checkout_session::ActiveModel = session.into();
        active.total_amount = Set(totals.total_amount);
        active.item_count = Set(totals.item_count);
        active.discount_amount = Set(Decimal::ZERO);
        active.final_amount = Set(totals.total_amount);
        active.coupon_code = Set(None);
        active.coupon_applied = Set(false);
        CheckoutRepository::update(conn, active).await
    }

    /// Pins a frozen snapshot of one of the user's addresses to the session.
    #[instrument(skip(self))]
    pub async fn set_shipping_address(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        address_id: Uuid,
    ) -> Result<checkout_session::Model, ServiceError> {
        let uow = UnitOfWork::begin(&self.db, "checkout_set_address").await?;
        let result: Result<checkout_session::Model, ServiceError> = async {
            let conn = uow.conn();
            let session = Self::load_owned(conn, user_id, session_id).await?;
            if !session.is_pending() {
                return Err(CheckoutError::InvalidCheckoutState.into());
            }

            let address = AddressRepository::find_user_address(conn, address_id)
                .await?
                .ok_or(CheckoutError::AddressNotFound)?;
            if address.user_id != user_id {
                return Err(CheckoutError::AddressNotBelongToUser.into());
            }

            let snapshot = AddressRepository::snapshot(conn, &address).await?;
            let mut active: checkout_session::ActiveModel = session.into();
            active.shipping_address_id = Set(Some(snapshot.id));
            CheckoutRepository::update(conn, active).await
        }
        .await;
        uow.finish(result).await
    }

    /// Session, live lines and address for the review page.
    ///
    /// Does not reprice: a cart edited since the session was priced is
    /// reported as `CartUpdatedAfterCreatingCheckoutSession` so the client
    /// re-fetches the session first.
    #[instrument(skip(self))]
    pub async fn get_summary(&self, user_id: Uuid) -> Result<CheckoutSummary, ServiceError> {
        let conn = &*self.db;
        let session = CheckoutRepository::find_pending_by_user(conn, user_id)
            .await?
            .ok_or(CheckoutError::SessionNotFound)?;
        let lines = load_checkout_lines(conn, user_id).await?;
        if totals_of(&lines).item_count != session.item_count {
            return Err(CheckoutError::CartUpdatedAfterCreatingCheckoutSession.into());
        }

        let stock: Vec<StockLine> = lines.iter().map(CheckoutLine::stock_line).collect();
        InventoryGuard::validate_stock(conn, &stock).await?;

        let shipping_address = match session.shipping_address_id {
            Some(id) => AddressRepository::find_shipping_address(conn, id).await?,
            None => None,
        };

        Ok(CheckoutSummary {
            session,
            items: lines,
            shipping_address,
        })
    }

    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn apply_coupon(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        input: ApplyCouponInput,
    ) -> Result<CouponApplication, ServiceError> {
        let code = normalize_code(&input.code);
        let max_discount = self.max_discount_amount;

        let uow = UnitOfWork::begin(&self.db, "checkout_apply_coupon").await?;
        let result: Result<(checkout_session::Model, Option<String>), ServiceError> = async {
            let conn = uow.conn();
            let session = Self::load_owned(conn, user_id, session_id).await?;
            if !session.is_pending() {
                return Err(CouponError::CheckoutCompleted.into());
            }
            if session.coupon_applied {
                return Err(CouponError::CouponAlreadyApplied.into());
            }

            let coupon = CouponRepository::find_by_code(conn, &code)
                .await?
                .ok_or(CouponError::CouponNotFound)?;
            let quote = quote_coupon(session.total_amount, &coupon, Utc::now(), max_discount)?;
            let message = quote.message(max_discount);

            let mut active: checkout_session::ActiveModel = session.into();
            active.discount_amount = Set(quote.discount_amount);
            active.final_amount = Set(quote.final_amount);
            active.coupon_code = Set(Some(coupon.code));
            active.coupon_applied = Set(true);
            let session = CheckoutRepository::update(conn, active).await?;
            Ok((session, message))
        }
        .await;
        let (session, message) = uow.finish(result).await?;

        info!(session_id = %session.id, discount = %session.discount_amount, "coupon applied");
        self.event_sender
            .send_or_log(Event::CouponApplied {
                session_id: session.id,
                code,
                discount: session.discount_amount,
            })
            .await;

        Ok(CouponApplication { session, message })
    }

    #[instrument(skip(self))]
    pub async fn remove_coupon(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<checkout_session::Model, ServiceError> {
        let conn = &*self.db;
        let session = Self::load_owned(conn, user_id, session_id).await?;
        if session.status == CheckoutStatus::Completed {
            return Err(CouponError::CheckoutCompleted.into());
        }
        if !session.coupon_applied {
            return Err(CouponError::NoCouponApplied.into());
        }

        let total = session.total_amount;
        let mut active: checkout_session::ActiveModel = session.into();
        active.discount_amount = Set(Decimal::ZERO);
        active.final_amount = Set(total);
        active.coupon_code = Set(None);
        active.coupon_applied = Set(false);
        let session = CheckoutRepository::update(conn, active).await?;

        self.event_sender
            .send_or_log(Event::CouponRemoved {
                session_id: session.id,
            })
            .await;
        Ok(session)
    }

    /// Someone else's session is reported as missing.
    async fn load_owned<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<checkout_session::Model, ServiceError> {
        CheckoutRepository::find_by_id(conn, session_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| CheckoutError::SessionNotFound.into())
    }
}

pub(crate) fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
