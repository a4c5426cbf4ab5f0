//! Background bus listener.
//!
//! Two subscriptions, started once at startup and kept for the process
//! lifetime:
//!
//! - `order_request`: third-party lookups carrying a JSON order object, of
//!   which only `order_uid` is read. Answered from the cache to the message's
//!   reply address on a hit; forwarded unchanged to `order_query` on a miss.
//!   Bare identifiers on the same subject belong to the resolver and are
//!   skipped here (see [`order_relay_core::payload`]).
//! - `order_response`: every order seen is cached, overwriting any previous
//!   entry. No reply is sent.
//!
//! Errors are logged and end processing of that one message.

use order_relay_bus::{BusError, Bytes, Message, MessageBus, Subscription};
use order_relay_core::subjects::{ORDER_QUERY, ORDER_REQUEST, ORDER_RESPONSE};
use order_relay_core::{Order, OrderRequestPayload};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::state::AppState;

/// Handles to the two listener tasks.
#[derive(Debug)]
pub struct Listeners {
    requests: JoinHandle<()>,
    responses: JoinHandle<()>,
}

impl Listeners {
    /// Subscribe to `order_request` and `order_response` and spawn one task per
    /// subscription.
    ///
    /// Both subscriptions are established before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if either subscription fails.
    pub async fn start(state: &AppState) -> Result<Self, BusError> {
        let requests = state.bus().subscribe(ORDER_REQUEST).await?;
        let responses = state.bus().subscribe(ORDER_RESPONSE).await?;
        info!("Bus listeners subscribed");

        Ok(Self {
            requests: spawn_loop(state.clone(), requests, handle_order_request),
            responses: spawn_loop(state.clone(), responses, handle_order_response),
        })
    }

    /// Stop both listeners.
    pub fn shutdown(self) {
        self.requests.abort();
        self.responses.abort();
    }
}

fn spawn_loop<F, Fut>(state: AppState, mut subscription: Subscription, handler: F) -> JoinHandle<()>
where
    F: Fn(AppState, Message) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let span = info_span!("bus_listener", subject = subscription.subject());
    tokio::spawn(
        async move {
            while let Some(message) = subscription.next().await {
                handler(state.clone(), message).await;
            }
            warn!("Subscription closed, listener stopped");
        }
        .instrument(span),
    )
}

/// Serve a third-party `order_request` from the cache, or forward it.
pub async fn handle_order_request(state: AppState, message: Message) {
    let payload = match OrderRequestPayload::classify(&message.payload) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Error decoding order request");
            return;
        }
    };

    let key = match payload {
        OrderRequestPayload::Order(key) => key,
        OrderRequestPayload::Identifier(uid) => {
            debug!(kind = "identifier", order_uid = %uid, "Bare identifier, left to the resolver");
            return;
        }
    };

    if let Some(cached) = state.cache().get(&key.order_uid) {
        debug!(order_uid = %key.order_uid, "Cache hit, replying");
        send_order_response(state.bus().as_ref(), &cached, message.reply.as_deref()).await;
        return;
    }

    debug!(order_uid = %key.order_uid, "Cache miss, forwarding to order_query");
    if let Err(e) = state.bus().publish(ORDER_QUERY, message.payload).await {
        warn!(error = %e, "Error sending order query");
    }
}

/// Cache every order observed on `order_response`.
pub async fn handle_order_response(state: AppState, message: Message) {
    let order = match Order::from_json(&message.payload) {
        Ok(order) => order,
        Err(e) => {
            warn!(error = %e, "Error decoding order response");
            return;
        }
    };

    if order.order_uid.trim().is_empty() {
        warn!("Order response without order_uid, not cached");
        return;
    }

    debug!(order_uid = %order.order_uid, "Caching order");
    state.cache().put(order.order_uid.clone(), order);
}

async fn send_order_response(bus: &dyn MessageBus, order: &Order, reply: Option<&str>) {
    let Some(reply) = reply else {
        warn!(order_uid = %order.order_uid, "Order request has no reply address, dropping");
        return;
    };

    let payload = match order.to_json() {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Error encoding order response");
            return;
        }
    };

    if let Err(e) = bus.publish(reply, Bytes::from(payload)).await {
        warn!(error = %e, "Error sending order response");
    }
}
