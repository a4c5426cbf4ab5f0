//! Health routes. The resolver has no public HTTP API.
//!
//! ```text
//! GET  /health        - Liveness check
//! GET  /health/ready  - Readiness check (store reachable)
//! ```

use std::sync::Arc;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::store::OrderStore;

/// Build the health router.
pub fn app(store: Arc<dyn OrderStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(store): State<Arc<dyn OrderStore>>) -> StatusCode {
    match store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::store::MemoryStore;

    async fn status(store: Arc<MemoryStore>, uri: &str) -> StatusCode {
        app(store)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(status(Arc::new(MemoryStore::new()), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_follows_store() {
        let store = Arc::new(MemoryStore::new());
        assert_eq!(status(Arc::clone(&store), "/health/ready").await, StatusCode::OK);

        store.set_unavailable(Some("down"));
        assert_eq!(
            status(store, "/health/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
