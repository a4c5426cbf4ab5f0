//! Classification of `order_request` payloads.
//!
//! Two payload shapes share the `order_request` subject:
//!
//! - the relay's own synchronous lookup publishes a **bare order UID**;
//! - third-party requesters publish a **JSON order** and expect the relay to
//!   answer from its cache. Only `order_uid` is read; the rest of the object
//!   is not validated and the original bytes are what get forwarded.
//!
//! Nothing on the wire tags which shape a message carries, so both consumers
//! classify every payload and act only on the shape they own. The resolver
//! answers identifiers; the relay's background listener answers orders. A
//! tagged envelope or two distinct subjects would remove the guesswork, but
//! would also break existing publishers, so the shape is inferred here.

use serde::Deserialize;
use thiserror::Error;

use crate::types::OrderUid;

/// The part of a JSON `order_request` the relay acts on.
///
/// Any JSON object decodes; a missing `order_uid` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderRequestKey {
    #[serde(default)]
    pub order_uid: String,
}

/// A decoded `order_request` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRequestPayload {
    /// A bare identifier, e.g. `b563feb7b2b84b6test`.
    Identifier(OrderUid),
    /// A JSON order object; its `order_uid` is the lookup key.
    Order(OrderRequestKey),
}

/// Errors produced while classifying a payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Payload is empty or only whitespace.
    #[error("empty payload")]
    Empty,

    /// Payload is not valid UTF-8, so it cannot be an identifier.
    #[error("payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Payload starts like a JSON object but is not one.
    #[error("malformed order JSON: {0}")]
    MalformedOrder(#[from] serde_json::Error),

    /// Payload is a JSON array.
    #[error("order JSON must be an object")]
    NotAnObject,
}

impl OrderRequestPayload {
    /// Classify raw `order_request` bytes.
    ///
    /// Surrounding whitespace is bus framing and is ignored. A payload starting
    /// with `{` must be a well-formed JSON object; only its `order_uid` is read.
    /// A payload starting with `[` is rejected. Anything else is a bare
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] for empty, non-UTF-8 or malformed JSON payloads.
    pub fn classify(payload: &[u8]) -> Result<Self, PayloadError> {
        let text = std::str::from_utf8(payload)?.trim();
        if text.is_empty() {
            return Err(PayloadError::Empty);
        }

        if text.starts_with('{') {
            return Ok(Self::Order(serde_json::from_str(text)?));
        }
        if text.starts_with('[') {
            return Err(PayloadError::NotAnObject);
        }

        OrderUid::parse(text)
            .map(Self::Identifier)
            .map_err(|_| PayloadError::Empty)
    }

    /// Short label for structured logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Identifier(_) => "identifier",
            Self::Order(_) => "order",
        }
    }

    /// The order UID this payload asks about.
    #[must_use]
    pub fn order_uid(&self) -> &str {
        match self {
            Self::Identifier(uid) => uid.as_str(),
            Self::Order(key) => &key.order_uid,
        }
    }
}
