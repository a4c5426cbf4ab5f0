//! Order Relay Core - Shared types library.
//!
//! This crate provides the types shared by every order relay component:
//! - `order-relay` - Public HTTP relay with the in-memory order cache
//! - `order-resolver` - Bus-facing resolver backed by `PostgreSQL`
//! - `order-cli` - Schema migrations and seed loading
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no bus
//! clients. Transport lives in `order-relay-bus`.
//!
//! # Modules
//!
//! - [`types`] - The order record and its identifier
//! - [`subjects`] - Bus subject names
//! - [`payload`] - Classification of `order_request` payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod payload;
pub mod subjects;
pub mod types;

pub use payload::{OrderRequestKey, OrderRequestPayload, PayloadError};
pub use types::*;
