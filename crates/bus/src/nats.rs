//! Core NATS adapter.

use async_nats::connection::State;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tracing::{debug, info, instrument};

use crate::{BusError, Message, MessageBus, Subscription};

/// [`MessageBus`] backed by a Core NATS connection.
///
/// Cheaply cloneable: `async_nats::Client` is itself a handle.
#[derive(Clone, Debug)]
pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    /// Connect to a NATS server, e.g. `nats://localhost:4222`.
    ///
    /// # Errors
    ///
    /// Returns [`BusError::Connect`] if the server cannot be reached.
    #[instrument]
    pub async fn connect(url: &str) -> Result<Self, BusError> {
        let client = async_nats::connect(url)
            .await
            .map_err(|e| BusError::Connect(e.to_string()))?;
        info!("Connected to NATS");
        Ok(Self { client })
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn from_client(client: async_nats::Client) -> Self {
        Self { client }
    }

    /// Underlying `async-nats` client.
    #[must_use]
    pub const fn client(&self) -> &async_nats::Client {
        &self.client
    }
}

#[async_trait]
impl MessageBus for NatsBus {
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BusError> {
        self.client
            .publish(subject.to_owned(), payload)
            .await
            .map_err(|e| BusError::Publish {
                subject: subject.to_owned(),
                reason: e.to_string(),
            })
    }

    async fn publish_with_reply(
        &self,
        subject: &str,
        reply: &str,
        payload: Bytes,
    ) -> Result<(), BusError> {
        self.client
            .publish_with_reply(subject.to_owned(), reply.to_owned(), payload)
            .await
            .map_err(|e| BusError::Publish {
                subject: subject.to_owned(),
                reason: e.to_string(),
            })
    }

    async fn subscribe(&self, subject: &str) -> Result<Subscription, BusError> {
        let subscriber =
            self.client
                .subscribe(subject.to_owned())
                .await
                .map_err(|e| BusError::Subscribe {
                    subject: subject.to_owned(),
                    reason: e.to_string(),
                })?;
        debug!(subject, "Subscribed");

        // Dropping the async-nats subscriber sends UNSUB to the server.
        let messages = subscriber
            .map(|message| Message {
                subject: message.subject.to_string(),
                reply: message.reply.map(|reply| reply.to_string()),
                payload: message.payload,
            })
            .boxed();

        Ok(Subscription::new(subject, messages))
    }

    fn new_inbox(&self) -> String {
        self.client.new_inbox()
    }

    fn is_connected(&self) -> bool {
        matches!(self.client.connection_state(), State::Connected)
    }
}
