//! In-memory order cache.
//!
//! One `HashMap` behind one `Mutex`, covering both reads and writes. Entries
//! are never evicted, never expire and are not persisted: they live exactly as
//! long as the process. Memory therefore grows with the number of distinct
//! orders seen. This is a known limitation, not an oversight; sharding by a
//! hash of the UID or bounding the map are the upgrade paths if it matters.
//!
//! The lock is held only for the map operation itself, never across I/O.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use order_relay_core::Order;

/// Thread-safe `order_uid -> Order` map.
#[derive(Debug, Default)]
pub struct OrderCache {
    orders: Mutex<HashMap<String, Arc<Order>>>,
}

impl OrderCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an order.
    #[must_use]
    pub fn get(&self, order_uid: &str) -> Option<Arc<Order>> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(order_uid)
            .cloned()
    }

    /// Store an order, replacing any existing entry for the same UID.
    ///
    /// Last writer wins; there is no timestamp comparison.
    pub fn put(&self, order_uid: impl Into<String>, order: Order) {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(order_uid.into(), Arc::new(order));
    }

    /// Number of cached orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
