pub mod commerce;
pub mod inventory;
pub mod order_cancellation;
pub mod order_status;
pub mod orders;
pub mod payment_gateway;
pub mod payments;
pub mod returns;
pub mod wallet;
