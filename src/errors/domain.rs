//! Closed error sets for each area of the storefront.
//!
//! Every variant carries a stable snake_case code (via `strum::IntoStaticStr`)
//! that clients can match on, and a [`ErrorKind`] that decides the HTTP status.

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Serialize;
use strum::IntoStaticStr;
use uuid::Uuid;

/// Broad category of a business error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Conflict,
    Validation,
    ResourceExhausted,
    External,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::ResourceExhausted => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::External => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Common accessors shared by the domain error enums.
pub trait DomainError {
    fn code(&self) -> &'static str;
    fn kind(&self) -> ErrorKind;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum CouponError {
    #[error("Coupon not found")]
    CouponNotFound,
    #[error("Coupon is not active")]
    CouponInactive,
    #[error("Coupon has expired")]
    CouponExpired,
    #[error("A coupon is already applied to this checkout")]
    CouponAlreadyApplied,
    #[error("Order total is below the coupon minimum of {minimum}")]
    OrderTotalBelowMinimum { minimum: Decimal },
    #[error("No coupon is applied to this checkout")]
    NoCouponApplied,
    #[error("Checkout session is already completed")]
    CheckoutCompleted,
    #[error("Coupon code {0} is already in use")]
    CouponCodeTaken(String),
    #[error("Discount percentage must be greater than 0 and at most 100")]
    InvalidDiscountPercentage,
    #[error("Minimum order amount cannot be negative")]
    InvalidMinimumOrderAmount,
}

impl DomainError for CouponError {
    fn code(&self) -> &'static str {
        self.into()
    }

    fn kind(&self) -> ErrorKind {
        match self {
            CouponError::CouponNotFound => ErrorKind::NotFound,
            CouponError::CouponAlreadyApplied
            | CouponError::CheckoutCompleted
            | CouponError::NoCouponApplied
            | CouponError::CouponCodeTaken(_) => ErrorKind::Conflict,
            CouponError::CouponInactive
            | CouponError::CouponExpired
            | CouponError::OrderTotalBelowMinimum { .. }
            | CouponError::InvalidDiscountPercentage
            | CouponError::InvalidMinimumOrderAmount => ErrorKind::Validation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum CheckoutError {
    #[error("Checkout session not found")]
    SessionNotFound,
    #[error("Checkout session is not pending")]
    InvalidCheckoutState,
    #[error("Address not found")]
    AddressNotFound,
    #[error("Address does not belong to the user")]
    AddressNotBelongToUser,
    #[error("Cart was updated after the checkout session was created")]
    CartUpdatedAfterCreatingCheckoutSession,
    #[error("Cart is empty")]
    EmptyCart,
}

impl DomainError for CheckoutError {
    fn code(&self) -> &'static str {
        self.into()
    }

    fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::SessionNotFound | CheckoutError::AddressNotFound => ErrorKind::NotFound,
            CheckoutError::AddressNotBelongToUser => ErrorKind::Forbidden,
            CheckoutError::InvalidCheckoutState
            | CheckoutError::CartUpdatedAfterCreatingCheckoutSession => ErrorKind::Conflict,
            CheckoutError::EmptyCart => ErrorKind::Validation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum OrderError {
    #[error("Order not found")]
    OrderNotFound,
    #[error("Order does not belong to the user")]
    Unauthorized,
    #[error("Order has already been placed for this checkout")]
    OrderAlreadyPlaced,
    #[error("Order is already cancelled")]
    OrderAlreadyCancelled,
    #[error("Order cannot be cancelled in status {status}")]
    OrderNotCancellable { status: String },
    #[error("Order is not pending cancellation")]
    OrderNotPendingCancellation,
    #[error("Order is already delivered")]
    OrderAlreadyDelivered,
    #[error("A shipping address is required")]
    InvalidAddress,
    #[error("Cash on delivery is limited to orders up to {limit}")]
    CodLimitExceeded { limit: Decimal },
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("Cancellation request not found")]
    CancellationRequestNotFound,
}

impl DomainError for OrderError {
    fn code(&self) -> &'static str {
        self.into()
    }

    fn kind(&self) -> ErrorKind {
        match self {
            OrderError::OrderNotFound | OrderError::CancellationRequestNotFound => {
                ErrorKind::NotFound
            }
            OrderError::Unauthorized => ErrorKind::Forbidden,
            OrderError::OrderAlreadyPlaced
            | OrderError::OrderAlreadyCancelled
            | OrderError::OrderNotCancellable { .. }
            | OrderError::OrderNotPendingCancellation
            | OrderError::OrderAlreadyDelivered
            | OrderError::InvalidTransition { .. } => ErrorKind::Conflict,
            OrderError::InvalidAddress => ErrorKind::Validation,
            OrderError::CodLimitExceeded { .. } => ErrorKind::ResourceExhausted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum InventoryError {
    #[error("Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },
    #[error("Product {0} not found")]
    ProductNotFound(Uuid),
    #[error("Product {0} is no longer available")]
    ProductUnavailable(Uuid),
}

impl DomainError for InventoryError {
    fn code(&self) -> &'static str {
        self.into()
    }

    fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::InsufficientStock { .. } => ErrorKind::ResourceExhausted,
            InventoryError::ProductNotFound(_) => ErrorKind::NotFound,
            InventoryError::ProductUnavailable(_) => ErrorKind::Validation,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum PaymentError {
    #[error("Payment not found")]
    PaymentNotFound,
    #[error("Invalid payment signature")]
    InvalidSignature,
    #[error("Payment gateway order creation failed: {0}")]
    GatewayOrderCreation(String),
    #[error("Payment has already been captured")]
    PaymentAlreadyCaptured,
}

impl DomainError for PaymentError {
    fn code(&self) -> &'static str {
        self.into()
    }

    fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::PaymentNotFound => ErrorKind::NotFound,
            PaymentError::PaymentAlreadyCaptured => ErrorKind::Conflict,
            PaymentError::InvalidSignature | PaymentError::GatewayOrderCreation(_) => {
                ErrorKind::External
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum ReturnError {
    #[error("Return request not found")]
    ReturnRequestNotFound,
    #[error("Return window has expired")]
    ReturnWindowExpired,
    #[error("A return has already been requested for this order")]
    ReturnAlreadyRequested,
    #[error("Return reason must not be blank")]
    InvalidReturnReason,
    #[error("Order has not been delivered")]
    OrderNotDelivered,
    #[error("Return request has already been processed")]
    ReturnRequestAlreadyProcessed,
    #[error("Return request has not been approved")]
    ReturnNotApproved,
    #[error("Refund has already been initiated")]
    RefundAlreadyInitiated,
    #[error("Refunds are not allowed on cancelled orders")]
    OrderCancelled,
    #[error("Order has already been marked as returned to the seller")]
    AlreadyMarkedAsReturned,
}

impl DomainError for ReturnError {
    fn code(&self) -> &'static str {
        self.into()
    }

    fn kind(&self) -> ErrorKind {
        match self {
            ReturnError::ReturnRequestNotFound => ErrorKind::NotFound,
            ReturnError::InvalidReturnReason => ErrorKind::Validation,
            ReturnError::ReturnWindowExpired
            | ReturnError::ReturnAlreadyRequested
            | ReturnError::OrderNotDelivered
            | ReturnError::ReturnRequestAlreadyProcessed
            | ReturnError::ReturnNotApproved
            | ReturnError::RefundAlreadyInitiated
            | ReturnError::OrderCancelled
            | ReturnError::AlreadyMarkedAsReturned => ErrorKind::Conflict,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum WalletError {
    #[error("Wallet amount must be positive")]
    InvalidAmount,
    #[error("Insufficient wallet balance: available {available}")]
    InsufficientBalance { available: Decimal },
}

impl DomainError for WalletError {
    fn code(&self) -> &'static str {
        self.into()
    }

    fn kind(&self) -> ErrorKind {
        match self {
            WalletError::InvalidAmount => ErrorKind::Validation,
            WalletError::InsufficientBalance { .. } => ErrorKind::ResourceExhausted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum CartError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
    #[error("Cart item not found")]
    CartItemNotFound,
}

impl DomainError for CartError {
    fn code(&self) -> &'static str {
        self.into()
    }

    fn kind(&self) -> ErrorKind {
        match self {
            CartError::InvalidQuantity => ErrorKind::Validation,
            CartError::CartItemNotFound => ErrorKind::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&CouponError::CouponNotFound, "coupon_not_found")]
    #[test_case(&CouponError::OrderTotalBelowMinimum { minimum: Decimal::ONE_HUNDRED }, "order_total_below_minimum")]
    #[test_case(&CheckoutError::CartUpdatedAfterCreatingCheckoutSession, "cart_updated_after_creating_checkout_session")]
    #[test_case(&OrderError::CodLimitExceeded { limit: Decimal::ONE }, "cod_limit_exceeded")]
    #[test_case(&ReturnError::ReturnWindowExpired, "return_window_expired")]
    #[test_case(&PaymentError::InvalidSignature, "invalid_signature")]
    fn codes_are_snake_case(err: &dyn DomainError, expected: &str) {
        assert_eq!(err.code(), expected);
    }

    #[test]
    fn insufficient_stock_is_resource_exhaustion() {
        let err = InventoryError::InsufficientStock {
            product_id: Uuid::nil(),
            requested: 3,
            available: 1,
        };
        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
        assert_eq!(err.kind().status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn ownership_errors_are_forbidden() {
        assert_eq!(OrderError::Unauthorized.kind(), ErrorKind::Forbidden);
        assert_eq!(
            CheckoutError::AddressNotBelongToUser.kind(),
            ErrorKind::Forbidden
        );
    }
}
