//! Order resolver library.
//!
//! Listens on `order_request` for bare order identifiers, looks them up in
//! `PostgreSQL` and publishes the order on `order_response`, preserving the
//! requester's reply address so the relay can correlate it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod resolver;
pub mod routes;
pub mod store;

pub use config::ResolverConfig;
pub use resolver::{Outcome, Resolver};
pub use store::{MemoryStore, OrderStore, PgOrderStore, StoreError};
