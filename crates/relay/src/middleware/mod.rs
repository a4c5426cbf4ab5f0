//! HTTP middleware for the relay.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (binary only)
//! 2. `TraceLayer` (request span)
//! 3. Request ID

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
