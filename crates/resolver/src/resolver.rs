//! Answers bare-identifier `order_request` messages from the order store.
//!
//! | Lookup result | Bus effect                                           | `outcome`     |
//! |---------------|------------------------------------------------------|---------------|
//! | found         | publish JSON on `order_response`, reply-to preserved | `replied`     |
//! | not found     | none                                                 | `not_found`   |
//! | store error   | none                                                 | `store_error` |
//!
//! Requesters never see a negative answer; they time out. JSON order payloads
//! on `order_request` are third-party lookups handled by the relay and are
//! skipped here.

use std::fmt;
use std::sync::Arc;

use order_relay_bus::{BusError, Bytes, Message, MessageBus};
use order_relay_core::OrderRequestPayload;
use order_relay_core::subjects::{ORDER_REQUEST, ORDER_RESPONSE};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::store::OrderStore;

/// What happened to one `order_request`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Replied,
    NotFound,
    StoreError,
    /// A full order, not an identifier.
    Skipped,
    /// Empty or not UTF-8.
    Malformed,
    /// Found, but encoding or publishing the response failed.
    PublishFailed,
}

impl Outcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Replied => "replied",
            Self::NotFound => "not_found",
            Self::StoreError => "store_error",
            Self::Skipped => "skipped",
            Self::Malformed => "malformed",
            Self::PublishFailed => "publish_failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bus handle plus store handle. Cheap to clone.
#[derive(Clone)]
pub struct Resolver {
    bus: Arc<dyn MessageBus>,
    store: Arc<dyn OrderStore>,
}

impl Resolver {
    #[must_use]
    pub fn new(bus: Arc<dyn MessageBus>, store: Arc<dyn OrderStore>) -> Self {
        Self { bus, store }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    /// Subscribe to `order_request` and handle each message on its own task.
    ///
    /// The subscription is established before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`BusError`] if the subscription fails.
    pub async fn start(self) -> Result<JoinHandle<()>, BusError> {
        let mut requests = self.bus.subscribe(ORDER_REQUEST).await?;
        info!("Resolver subscribed to {ORDER_REQUEST}");

        let span = info_span!("resolver_listener", subject = ORDER_REQUEST);
        Ok(tokio::spawn(
            async move {
                while let Some(message) = requests.next().await {
                    let resolver = self.clone();
                    tokio::spawn(
                        async move {
                            resolver.handle(message).await;
                        }
                        .in_current_span(),
                    );
                }
                warn!("Subscription closed, resolver stopped");
            }
            .instrument(span),
        ))
    }

    /// Handle one `order_request`.
    pub async fn handle(&self, message: Message) -> Outcome {
        let uid = match OrderRequestPayload::classify(&message.payload) {
            Ok(OrderRequestPayload::Identifier(uid)) => uid,
            Ok(OrderRequestPayload::Order(key)) => {
                let outcome = Outcome::Skipped;
                debug!(%outcome, kind = "order", order_uid = %key.order_uid, "JSON order payload, left to the relay");
                return outcome;
            }
            Err(e) => {
                let outcome = Outcome::Malformed;
                warn!(%outcome, error = %e, "Undecodable order request");
                return outcome;
            }
        };

        let order = match self.store.lookup(&uid).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                let outcome = Outcome::NotFound;
                info!(%outcome, order_uid = %uid, "Order not found");
                return outcome;
            }
            Err(e) => {
                let outcome = Outcome::StoreError;
                error!(%outcome, order_uid = %uid, error = %e, "Error looking up order");
                return outcome;
            }
        };

        let payload = match order.to_json() {
            Ok(payload) => Bytes::from(payload),
            Err(e) => {
                let outcome = Outcome::PublishFailed;
                error!(%outcome, order_uid = %uid, error = %e, "Error encoding order");
                return outcome;
            }
        };

        let published = match message.reply.as_deref() {
            Some(reply) => {
                self.bus
                    .publish_with_reply(ORDER_RESPONSE, reply, payload)
                    .await
            }
            None => self.bus.publish(ORDER_RESPONSE, payload).await,
        };

        if let Err(e) = published {
            let outcome = Outcome::PublishFailed;
            error!(%outcome, order_uid = %uid, error = %e, "Error sending order response");
            return outcome;
        }

        let outcome = Outcome::Replied;
        debug!(%outcome, order_uid = %uid, reply = ?message.reply, "Order response sent");
        outcome
    }
}
