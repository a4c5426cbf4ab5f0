//! Bus subject names shared by the relay and the resolver.
//!
//! Publishers and subscribers agree on these out of band; nothing on the bus
//! enforces them.

/// Lookup requests. The payload is either a bare order UID or a JSON order,
/// see [`crate::payload::OrderRequestPayload`].
pub const ORDER_REQUEST: &str = "order_request";

/// Raw bytes of third-party lookups the relay could not answer from its cache.
pub const ORDER_QUERY: &str = "order_query";

/// JSON-encoded orders, published with the requester's reply address as
/// reply-to so a waiting caller can correlate it.
pub const ORDER_RESPONSE: &str = "order_response";
