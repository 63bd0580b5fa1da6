pub mod cancellation_request;
pub mod commerce;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod product;
pub mod return_request;
pub mod wallet;
pub mod wallet_transaction;

pub use order::{DeliveryStatus, OrderStatus, RefundStatus};
pub use payment::{PaymentMethod, PaymentStatus};

pub use cancellation_request::Entity as CancellationRequest;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use payment::Entity as Payment;
pub use product::Entity as Product;
pub use return_request::Entity as ReturnRequest;
pub use wallet::Entity as Wallet;
pub use wallet_transaction::Entity as WalletTransaction;
