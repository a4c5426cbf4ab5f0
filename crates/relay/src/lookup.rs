//! Cache-aside order lookup with a synchronous bus round trip on miss.
//!
//! ```text
//! received -> cache_check -> hit:  respond
//!                         -> miss: publish order_request -> await order_response (<= timeout)
//!                                  -> reply:   respond
//!                                  -> timeout: fail
//! ```
//!
//! There are no retries; one timeout is terminal for the request.

use std::sync::Arc;
use std::time::Duration;

use order_relay_bus::{BusError, Bytes, MessageBus};
use order_relay_core::subjects::{ORDER_REQUEST, ORDER_RESPONSE};
use order_relay_core::{Order, OrderUid};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::state::AppState;

/// Errors from a single lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    /// No correlated reply arrived in time.
    #[error("no order_response within {0:?}")]
    Timeout(Duration),

    /// The correlated reply was not a valid order.
    #[error("malformed order_response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Subscribe or publish failed.
    #[error("bus error: {0}")]
    Transport(#[from] BusError),
}

/// Resolve an order, answering from the cache when possible.
///
/// A cache hit never touches the bus. On a miss the order returned by the
/// round trip is **not** written to the cache here; the background
/// `order_response` listener observes the same reply and caches it.
///
/// # Errors
///
/// Returns [`LookupError`] when the round trip fails.
#[instrument(skip(state), fields(order_uid = %uid))]
pub async fn lookup_order(state: &AppState, uid: &OrderUid) -> Result<Arc<Order>, LookupError> {
    if let Some(order) = state.cache().get(uid.as_str()) {
        debug!("Cache hit");
        return Ok(order);
    }

    debug!("Cache miss, asking resolver");
    let order = request_order(state.bus().as_ref(), uid, state.config().lookup_timeout).await?;
    Ok(Arc::new(order))
}

/// Synchronous request-reply over publish/subscribe.
///
/// 1. subscribe to `order_response` (scoped to this call),
/// 2. publish the bare UID to `order_request` with a fresh inbox as reply address,
/// 3. wait until `timeout` for an `order_response` whose reply-to is that inbox,
///    skipping responses addressed to other requesters,
/// 4. drop the subscription on every exit path; a late reply reaches no one.
///
/// # Errors
///
/// - [`LookupError::Timeout`] if no correlated reply arrives in time
/// - [`LookupError::Decode`] if the reply is not an order
/// - [`LookupError::Transport`] if subscribe or publish fails
pub async fn request_order(
    bus: &dyn MessageBus,
    uid: &OrderUid,
    timeout: Duration,
) -> Result<Order, LookupError> {
    let inbox = bus.new_inbox();
    let mut responses = bus.subscribe(ORDER_RESPONSE).await?;

    bus.publish_with_reply(
        ORDER_REQUEST,
        &inbox,
        Bytes::copy_from_slice(uid.as_bytes()),
    )
    .await?;

    let deadline = Instant::now() + timeout;
    loop {
        let message = match responses.next_before(deadline).await {
            Ok(message) => message,
            Err(BusError::Timeout { .. }) => return Err(LookupError::Timeout(timeout)),
            Err(e) => return Err(e.into()),
        };

        if message.reply.as_deref() != Some(inbox.as_str()) {
            debug!(reply = ?message.reply, "Skipping order_response for another requester");
            continue;
        }

        return Ok(Order::from_json(&message.payload)?);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use order_relay_bus::MemoryBus;

    use super::*;
    use crate::test_support::{sample_order, spawn_responder, test_state};

    #[tokio::test]
    async fn test_cache_hit_skips_bus() {
        let bus = MemoryBus::new();
        let state = test_state(&bus, Duration::from_millis(50));
        let order = sample_order("cached");
        state.cache().put("cached", order.clone());

        let found = lookup_order(&state, &OrderUid::parse("cached").unwrap())
            .await
            .unwrap();

        assert_eq!(*found, order);
        assert_eq!(bus.stats().published(), 0);
        assert_eq!(bus.stats().subscribed(), 0);
    }

    #[tokio::test]
    async fn test_round_trip_returns_reply_without_caching() {
        let bus = MemoryBus::new();
        let state = test_state(&bus, Duration::from_millis(500));
        let order = sample_order("fresh");
        let _responder = spawn_responder(&bus, order.clone()).await;

        let found = lookup_order(&state, &OrderUid::parse("fresh").unwrap())
            .await
            .unwrap();

        assert_eq!(*found, order);
        assert!(state.cache().get("fresh").is_none());
        assert_eq!(bus.published_on(ORDER_REQUEST), 1);
    }

    #[tokio::test]
    async fn test_timeout_when_nobody_answers() {
        let bus = MemoryBus::new();
        let started = Instant::now();

        let result = request_order(
            &bus,
            &OrderUid::parse("missing").unwrap(),
            Duration::from_millis(50),
        )
        .await;

        assert!(matches!(result, Err(LookupError::Timeout(_))));
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(bus.active_subscribers(ORDER_RESPONSE), 0);
    }

    #[tokio::test]
    async fn test_uncorrelated_response_is_skipped() {
        let bus = MemoryBus::new();
        let other = sample_order("other");

        // Someone else's answer lands first; ours never comes.
        let noise = bus.clone();
        tokio::spawn(async move {
            let mut requests = noise.subscribe(ORDER_REQUEST).await.unwrap();
            requests.next().await;
            noise
                .publish_with_reply(
                    ORDER_RESPONSE,
                    "_INBOX.someone-else",
                    Bytes::from(other.to_json().unwrap()),
                )
                .await
                .unwrap();
        });
        tokio::task::yield_now().await;

        let result = request_order(
            &bus,
            &OrderUid::parse("mine").unwrap(),
            Duration::from_millis(100),
        )
        .await;

        assert!(matches!(result, Err(LookupError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_decode_error() {
        let bus = MemoryBus::new();
        let responder = bus.clone();
        let mut requests = bus.subscribe(ORDER_REQUEST).await.unwrap();
        tokio::spawn(async move {
            let request = requests.next().await.unwrap();
            responder
                .publish_with_reply(
                    ORDER_RESPONSE,
                    request.reply.as_deref().unwrap(),
                    Bytes::from_static(b"not json"),
                )
                .await
                .unwrap();
        });

        let result = request_order(
            &bus,
            &OrderUid::parse("abc").unwrap(),
            Duration::from_millis(500),
        )
        .await;

        assert!(matches!(result, Err(LookupError::Decode(_))));
        assert_eq!(bus.active_subscribers(ORDER_RESPONSE), 0);
    }
}
