//! Order store gateway.
//!
//! The resolver depends on [`OrderStore`] rather than on `PgPool` so it can be
//! exercised against an in-memory store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use order_relay_core::{Order, OrderUid};
use sqlx::PgPool;
use thiserror::Error;

use crate::db::{OrderRepository, RepositoryError};

/// Store lookup failures. "Not found" is `Ok(None)`, not an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to persisted orders.
#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    /// Fetch one order by UID.
    async fn lookup(&self, uid: &OrderUid) -> Result<Option<Order>, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// [`OrderStore`] backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn lookup(&self, uid: &OrderUid) -> Result<Option<Order>, StoreError> {
        Ok(OrderRepository::new(&self.pool).get_by_uid(uid).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(OrderRepository::new(&self.pool).ping().await?)
    }
}

/// In-memory [`OrderStore`] for tests and local runs without a database.
///
/// [`MemoryStore::set_unavailable`] makes every call fail, standing in for a
/// database outage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    orders: Mutex<HashMap<String, Order>>,
    unavailable: Mutex<Option<String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store preloaded with `orders`, keyed by their UID.
    #[must_use]
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let store = Self::new();
        for order in orders {
            store.insert(order);
        }
        store
    }

    pub fn insert(&self, order: Order) {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(order.order_uid.clone(), order);
    }

    /// Fail every subsequent call with `reason`, or recover with `None`.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        *self
            .unavailable
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = reason.map(str::to_string);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        match &*self
            .unavailable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
        {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn lookup(&self, uid: &OrderUid) -> Result<Option<Order>, StoreError> {
        self.check_available()?;
        Ok(self
            .orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uid.as_str())
            .cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
