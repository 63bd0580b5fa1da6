/// Commerce API handlers module
pub mod carts;
pub mod checkout;
pub mod coupons;

// Re-export route builders
pub use carts::carts_routes;
pub use checkout::checkout_routes;
pub use coupons::coupons_admin_routes;
