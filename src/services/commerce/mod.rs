//! Pre-purchase commerce: cart, checkout session, coupons and pricing.
pub mod cart_service;
pub mod checkout_service;
pub mod coupon_service;
pub mod pricing_service;

pub use cart_service::{AddToCartInput, CartService, CartView, UpdateCartItemInput};
pub use checkout_service::{
    ApplyCouponInput, CheckoutLine, CheckoutService, CheckoutSummary, CouponApplication,
    SetShippingAddressInput,
};
pub use coupon_service::{CouponService, CreateCouponInput, UpdateCouponInput};
