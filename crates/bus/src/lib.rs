//! Order Relay Bus - publish/subscribe adapter.
//!
//! The relay and the resolver talk to each other only through the
//! [`MessageBus`] trait. Two implementations are provided:
//!
//! - [`NatsBus`] - Core NATS via `async-nats` (production)
//! - [`MemoryBus`] - In-process fan-out over tokio channels, with publish and
//!   subscribe counters (tests and local development)
//!
//! # Semantics
//!
//! - Publishes are fire-and-forget: success means the message was handed to the
//!   transport, not that anyone received it.
//! - A [`Subscription`] receives every message published on its subject after
//!   it was created. Dropping it unsubscribes; messages arriving afterwards are
//!   received by no one.
//! - A reply address is an ordinary subject. Request-reply is built by the
//!   caller: subscribe, publish with a reply address, wait with a deadline.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod memory;
pub mod nats;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use thiserror::Error;
use tokio::time::Instant;

pub use bytes::Bytes;
pub use memory::{BusStats, MemoryBus};
pub use nats::NatsBus;

/// Errors raised by a bus adapter.
#[derive(Debug, Error)]
pub enum BusError {
    /// Could not establish the connection.
    #[error("bus connection failed: {0}")]
    Connect(String),

    /// Publish was rejected by the transport.
    #[error("publish to {subject} failed: {reason}")]
    Publish { subject: String, reason: String },

    /// Subscribe was rejected by the transport.
    #[error("subscribe to {subject} failed: {reason}")]
    Subscribe { subject: String, reason: String },

    /// No message arrived before the deadline.
    #[error("no message on {subject} before the deadline")]
    Timeout { subject: String },

    /// The subscription ended (connection closed or bus dropped).
    #[error("subscription to {subject} closed")]
    Closed { subject: String },
}

/// A message received from the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Subject the message was published on.
    pub subject: String,
    /// Reply address set by the publisher, if any.
    pub reply: Option<String>,
    /// Raw payload bytes.
    pub payload: Bytes,
}

/// A live subscription to one subject.
///
/// Unsubscribes when dropped, so a subscription scoped to a single request is
/// released on every exit path of that request.
pub struct Subscription {
    subject: String,
    messages: BoxStream<'static, Message>,
}

impl Subscription {
    /// Wrap a message stream produced by an adapter.
    #[must_use]
    pub fn new(subject: impl Into<String>, messages: BoxStream<'static, Message>) -> Self {
        Self {
            subject: subject.into(),
            messages,
        }
    }

    /// The subject this subscription listens on.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Wait for the next message. Returns `None` once the subscription ends.
    pub async fn next(&mut self) -> Option<Message> {
        self.messages.next().await
    }

    /// Wait for the next message until `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Timeout`] when the deadline passes first and
    /// [`BusError::Closed`] when the subscription ends.
    pub async fn next_before(&mut self, deadline: Instant) -> Result<Message, BusError> {
        match tokio::time::timeout_at(deadline, self.messages.next()).await {
            Ok(Some(message)) => Ok(message),
            Ok(None) => Err(BusError::Closed {
                subject: self.subject.clone(),
            }),
            Err(_) => Err(BusError::Timeout {
                subject: self.subject.clone(),
            }),
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

/// Publish/subscribe substrate used by the relay and the resolver.
#[async_trait]
pub trait MessageBus: Send + Sync + 'static {
    /// Fire-and-forget publish.
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BusError>;

    /// Publish with a reply address the receiver should answer to.
    async fn publish_with_reply(
        &self,
        subject: &str,
        reply: &str,
        payload: Bytes,
    ) -> Result<(), BusError>;

    /// Subscribe to a subject.
    async fn subscribe(&self, subject: &str) -> Result<Subscription, BusError>;

    /// Create a unique reply address.
    fn new_inbox(&self) -> String;

    /// Whether the transport currently has a live connection.
    fn is_connected(&self) -> bool {
        true
    }
}
