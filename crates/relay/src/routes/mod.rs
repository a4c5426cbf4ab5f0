//! HTTP route handlers for the relay.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Static index page
//! GET  /order/?orderUID=<id>   - Order lookup (JSON)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (bus connection)
//! ```

pub mod health;
pub mod orders;

use axum::{Router, middleware, routing::get};
use tower_http::services::ServeFile;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the API routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/order", get(orders::show))
        .route("/order/", get(orders::show))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Build the complete application: routes, static index, request tracing.
///
/// Sentry layers are added by the binary so tests can build the same app
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    let index = ServeFile::new(&state.config().index_path);

    Router::new()
        .merge(routes())
        .route_service("/", index)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        #[allow(clippy::cast_possible_truncation)]
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
