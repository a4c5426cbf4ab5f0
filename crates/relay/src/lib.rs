//! Order relay library.
//!
//! Public HTTP lookup in front of an in-memory order cache, backed by a
//! synchronous request-reply round trip to the resolver over the message bus.
//! Exposed as a library so the binary and the integration tests build the
//! same application.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod error;
pub mod listener;
pub mod lookup;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::RelayConfig;
pub use listener::Listeners;
pub use routes::app;
pub use state::AppState;

#[cfg(test)]
pub(crate) mod test_support {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;
    use std::time::Duration;

    use order_relay_bus::{Bytes, MemoryBus, MessageBus};
    use order_relay_core::Order;
    use order_relay_core::subjects::{ORDER_REQUEST, ORDER_RESPONSE};
    use serde_json::json;
    use tokio::task::JoinHandle;

    use crate::config::RelayConfig;
    use crate::state::AppState;

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
            "items": [],
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

    pub fn test_state(bus: &MemoryBus, lookup_timeout: Duration) -> AppState {
        let config = RelayConfig {
            lookup_timeout,
            ..RelayConfig::default()
        };
        AppState::new(config, Arc::new(bus.clone()))
    }

    /// Answer the next `order_request` with `order`, addressed to its reply inbox.
    ///
    /// Subscribed before returning, so a request published afterwards is seen.
    pub async fn spawn_responder(bus: &MemoryBus, order: Order) -> JoinHandle<()> {
        let bus = bus.clone();
        let mut requests = bus.subscribe(ORDER_REQUEST).await.unwrap();
        tokio::spawn(async move {
            let request = requests.next().await.unwrap();
            bus.publish_with_reply(
                ORDER_RESPONSE,
                request.reply.as_deref().unwrap(),
                Bytes::from(order.to_json().unwrap()),
            )
            .await
            .unwrap();
        })
    }
}
