//! Integration tests for the order relay and resolver.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process tests (relay + resolver over an in-memory bus)
//! cargo test -p order-relay-integration-tests
//!
//! # Live tests against running services
//! order-cli migrate && order-cli seed model.json
//! cargo test -p order-relay-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `lookup_flow` - HTTP lookups through relay, bus and resolver
//! - `third_party_requests` - JSON order lookups from other bus clients
//! - `live_services` - `reqwest` against a running deployment (ignored by default)

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use order_relay::{AppState, Listeners, RelayConfig};
use order_relay_bus::MemoryBus;
use order_relay_core::Order;
use order_resolver::{MemoryStore, OrderStore, Resolver};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// UID of the reference order.
pub const SAMPLE_ORDER_UID: &str = "b563feb7b2b84b6test";

/// The reference order as stored: the `orders` row has no items.
#[must_use]
pub fn sample_order(uid: &str) -> Order {
    serde_json::from_value(json!({
        "order_uid": uid,
        "track_number": "WBILMTESTTRACK",
        "entry": "WBIL",
        "delivery": {
            "name": "Test Testov",
            "phone": "+9720000000",
            "zip": "2639809",
            "city": "Kiryat Mozkin",
            "address": "Ploshad Mira 15",
            "region": "Kraiot",
            "email": "test@gmail.com"
        },
        "payment": {
            "transaction": uid,
            "request_id": "",
            "currency": "USD",
            "provider": "wbpay",
            "amount": 1817,
            "payment_dt": 1_637_907_727,
            "bank": "alpha",
            "delivery_cost": 1500,
            "goods_total": 317,
            "custom_fee": 0
        },
        "locale": "en",
        "internal_signature": "",
        "customer_id": "test",
        "delivery_service": "meest",
        "shardkey": "9",
        "sm_id": 99,
        "date_created": "2021-11-26T06:22:19Z",
        "oof_shard": "1"
    }))
    .unwrap()
}

/// A relay and a resolver wired together over one [`MemoryBus`].
pub struct TestContext {
    pub bus: MemoryBus,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    listeners: Option<Listeners>,
    resolver: JoinHandle<()>,
}

impl TestContext {
    /// Start both components with `orders` in the store.
    pub async fn new(orders: impl IntoIterator<Item = Order>, lookup_timeout: Duration) -> Self {
        let bus = MemoryBus::new();
        let store = Arc::new(MemoryStore::with_orders(orders));

        let config = RelayConfig {
            lookup_timeout,
            ..RelayConfig::default()
        };
        let state = AppState::new(config, Arc::new(bus.clone()));
        let listeners = Listeners::start(&state).await.unwrap();

        let resolver = Resolver::new(
            Arc::new(bus.clone()),
            Arc::clone(&store) as Arc<dyn OrderStore>,
        )
        .start()
        .await
        .unwrap();

        Self {
            bus,
            state,
            store,
            listeners: Some(listeners),
            resolver,
        }
    }

    #[must_use]
    pub fn app(&self) -> Router {
        order_relay::app(self.state.clone())
    }

    /// `GET` through the relay router; returns status and parsed JSON body (or `Null`).
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    /// Wait until the relay's background listener has cached `uid`.
    pub async fn wait_until_cached(&self, uid: &str) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        while self.state.cache().get(uid).is_none() {
            assert!(
                tokio::time::Instant::now() < deadline,
                "order {uid} was never cached"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.take() {
            listeners.shutdown();
        }
        self.resolver.abort();
    }
}
