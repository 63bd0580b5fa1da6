//! Aggregate repositories.
//!
//! Every function takes the connection it runs on (`&impl ConnectionTrait`),
//! so the same call works against the pool or inside a `UnitOfWork`
//! transaction. Absent rows come back as `Ok(None)`; services decide which
//! domain error that means.

pub mod address_repository;
pub mod cart_repository;
pub mod checkout_repository;
pub mod coupon_repository;
pub mod order_repository;
pub mod payment_repository;
pub mod product_repository;
pub mod return_repository;
pub mod wallet_repository;

pub use address_repository::AddressRepository;
pub use cart_repository::CartRepository;
pub use checkout_repository::CheckoutRepository;
pub use coupon_repository::CouponRepository;
pub use order_repository::OrderRepository;
pub use payment_repository::PaymentRepository;
pub use product_repository::ProductRepository;
pub use return_repository::ReturnRepository;
pub use wallet_repository::WalletRepository;

/// Converts a 1-based page number into the paginator's 0-based index.
pub(crate) fn page_index(page: u64) -> u64 {
    page.saturating_sub(1)
}
