//! Core types for the order relay.

pub mod order;
pub mod order_uid;

pub use order::{Delivery, Item, Order, Payment};
pub use order_uid::{OrderUid, OrderUidError};
