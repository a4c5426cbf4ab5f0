//! In-process bus.
//!
//! Fan-out over unbounded tokio channels with exact-subject matching (no
//! wildcards). Counts publishes and subscriptions so tests can assert which
//! paths touched the bus.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::trace;

use crate::{BusError, Message, MessageBus, Subscription};

/// Publish and subscribe counters.
#[derive(Debug, Default)]
pub struct BusStats {
    published: AtomicU64,
    subscribed: AtomicU64,
    delivered: AtomicU64,
}

impl BusStats {
    /// Total publishes (with or without reply address).
    #[must_use]
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Total subscriptions ever created.
    #[must_use]
    pub fn subscribed(&self) -> u64 {
        self.subscribed.load(Ordering::Relaxed)
    }

    /// Total messages handed to a live subscriber.
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

/// [`MessageBus`] that never leaves the process.
///
/// Clones share the same subscriber table and counters.
#[derive(Clone, Default)]
pub struct MemoryBus {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    subscribers: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<Message>>>>,
    published_by_subject: Mutex<HashMap<String, u64>>,
    stats: BusStats,
}

impl MemoryBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish and subscribe counters.
    #[must_use]
    pub fn stats(&self) -> &BusStats {
        &self.inner.stats
    }

    /// Number of publishes on one subject.
    #[must_use]
    pub fn published_on(&self, subject: &str) -> u64 {
        self.inner
            .published_by_subject
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subject)
            .copied()
            .unwrap_or(0)
    }

    /// Number of subscriptions on `subject` that have not been dropped.
    #[must_use]
    pub fn active_subscribers(&self, subject: &str) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subject)
            .map_or(0, |senders| {
                senders.iter().filter(|tx| !tx.is_closed()).count()
            })
    }

    fn deliver(&self, subject: &str, reply: Option<&str>, payload: Bytes) {
        self.inner.stats.published.fetch_add(1, Ordering::Relaxed);
        *self
            .inner
            .published_by_subject
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(subject.to_owned())
            .or_insert(0) += 1;

        let message = Message {
            subject: subject.to_owned(),
            reply: reply.map(str::to_owned),
            payload,
        };

        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(senders) = subscribers.get_mut(subject) else {
            trace!(subject, "No subscribers, message dropped");
            return;
        };

        // Dropped subscriptions close their receiver; prune them here.
        senders.retain(|tx| {
            let delivered = tx.send(message.clone()).is_ok();
            if delivered {
                self.inner.stats.delivered.fetch_add(1, Ordering::Relaxed);
            }
            delivered
        });
    }
}

#[async_trait]
impl MessageBus for MemoryBus {
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BusError> {
        self.deliver(subject, None, payload);
        Ok(())
    }

    async fn publish_with_reply(
        &self,
        subject: &str,
        reply: &str,
        payload: Bytes,
    ) -> Result<(), BusError> {
        self.deliver(subject, Some(reply), payload);
        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> Result<Subscription, BusError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(subject.to_owned())
            .or_default()
            .push(tx);
        self.inner.stats.subscribed.fetch_add(1, Ordering::Relaxed);

        let messages = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|message| (message, rx))
        })
        .boxed();

        Ok(Subscription::new(subject, messages))
    }

    fn new_inbox(&self) -> String {
        format!("_INBOX.{}", uuid::Uuid::new_v4().simple())
    }
}
