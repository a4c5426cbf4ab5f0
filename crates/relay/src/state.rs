//! Application state shared across handlers and bus listeners.

use std::sync::Arc;

use order_relay_bus::MessageBus;

use crate::cache::OrderCache;
use crate::config::RelayConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It replaces process-wide
/// globals: each instance owns its own cache and bus handle, so several
/// relays can run side by side in one process (as the tests do).
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RelayConfig,
    cache: OrderCache,
    bus: Arc<dyn MessageBus>,
}

impl AppState {
    /// Create a new application state with an empty cache.
    ///
    /// # Arguments
    ///
    /// * `config` - Relay configuration
    /// * `bus` - Connected message bus
    #[must_use]
    pub fn new(config: RelayConfig, bus: Arc<dyn MessageBus>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                cache: OrderCache::new(),
                bus,
            }),
        }
    }

    /// Get a reference to the relay configuration.
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    /// Get a reference to the order cache.
    #[must_use]
    pub fn cache(&self) -> &OrderCache {
        &self.inner.cache
    }

    /// Get a reference to the message bus.
    #[must_use]
    pub fn bus(&self) -> &Arc<dyn MessageBus> {
        &self.inner.bus
    }
}
