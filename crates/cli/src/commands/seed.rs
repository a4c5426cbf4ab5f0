//! Seed the order store from a JSON document.
//!
//! The document is one order in wire format. Line items are accepted but not
//! stored; the `orders` row has no item columns.

use std::path::Path;

use order_relay_core::Order;
use order_resolver::db::{self, OrderRepository};
use tracing::{info, warn};

use super::database_url;

/// Insert the order in `file_path` into `orders`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded, the database URL is
/// missing, or the insert fails (including a duplicate `order_uid`).
pub async fn order(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading order from file");

    // Decode before connecting so a bad file fails fast
    let content = tokio::fs::read(path).await?;
    let order = Order::from_json(&content)?;
    if order.order_uid.trim().is_empty() {
        return Err("order_uid must not be empty".into());
    }
    if !order.items.is_empty() {
        warn!(items = order.items.len(), "Line items are not stored");
    }

    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    OrderRepository::new(&pool).create(&order).await?;

    info!(order_uid = %order.order_uid, "Order inserted");
    Ok(())
}
