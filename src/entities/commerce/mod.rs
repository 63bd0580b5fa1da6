/// Commerce entities module
pub mod cart_item;
pub mod checkout_session;
pub mod coupon;
pub mod shipping_address;
pub mod user_address;

// Re-export entities
pub use cart_item::{Entity as CartItem, Model as CartItemModel};
pub use checkout_session::{CheckoutStatus, Entity as CheckoutSession, Model as CheckoutSessionModel};
pub use coupon::{Entity as Coupon, Model as CouponModel};
pub use shipping_address::{Entity as ShippingAddress, Model as ShippingAddressModel};
pub use user_address::{Entity as UserAddress, Model as UserAddressModel};
