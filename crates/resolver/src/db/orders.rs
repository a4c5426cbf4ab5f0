//! Order repository.
//!
//! Orders are stored flat: nested delivery and payment fields become
//! `delivery_*` and `payment_*` columns. There is no items table, so every
//! order read back has an empty `items` list.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use order_relay_core::{Delivery, Order, OrderUid, Payment};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `orders` queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_uid: String,
    track_number: String,
    entry: String,
    delivery_name: String,
    delivery_phone: String,
    delivery_zip: String,
    delivery_city: String,
    delivery_address: String,
    delivery_region: String,
    delivery_email: String,
    payment_transaction: String,
    payment_request_id: String,
    payment_currency: String,
    payment_provider: String,
    payment_amount: Decimal,
    payment_payment_dt: i64,
    payment_bank: String,
    payment_delivery_cost: Decimal,
    payment_goods_total: Decimal,
    payment_custom_fee: Decimal,
    locale: String,
    internal_signature: String,
    customer_id: String,
    delivery_service: String,
    shardkey: String,
    sm_id: i32,
    date_created: DateTime<Utc>,
    oof_shard: String,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            order_uid: row.order_uid,
            track_number: row.track_number,
            entry: row.entry,
            delivery: Delivery {
                name: row.delivery_name,
                phone: row.delivery_phone,
                zip: row.delivery_zip,
                city: row.delivery_city,
                address: row.delivery_address,
                region: row.delivery_region,
                email: row.delivery_email,
            },
            payment: Payment {
                transaction: row.payment_transaction,
                request_id: row.payment_request_id,
                currency: row.payment_currency,
                provider: row.payment_provider,
                amount: row.payment_amount,
                payment_dt: row.payment_payment_dt,
                bank: row.payment_bank,
                delivery_cost: row.payment_delivery_cost,
                goods_total: row.payment_goods_total,
                custom_fee: row.payment_custom_fee,
            },
            items: Vec::new(),
            locale: row.locale,
            internal_signature: row.internal_signature,
            customer_id: row.customer_id,
            delivery_service: row.delivery_service,
            shardkey: row.shardkey,
            sm_id: row.sm_id,
            date_created: row.date_created,
            oof_shard: row.oof_shard,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by its UID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self), fields(order_uid = %uid))]
    pub async fn get_by_uid(&self, uid: &OrderUid) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT order_uid, track_number, entry,
                   delivery_name, delivery_phone, delivery_zip, delivery_city,
                   delivery_address, delivery_region, delivery_email,
                   payment_transaction, payment_request_id, payment_currency,
                   payment_provider, payment_amount, payment_payment_dt, payment_bank,
                   payment_delivery_cost, payment_goods_total, payment_custom_fee,
                   locale, internal_signature, customer_id, delivery_service,
                   shardkey, sm_id, date_created, oof_shard
            FROM orders
            WHERE order_uid = $1
            ",
        )
        .bind(uid)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Order::from))
    }

    /// Insert a new order. Line items are not stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the `order_uid` already exists.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, order), fields(order_uid = %order.order_uid))]
    pub async fn create(&self, order: &Order) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO orders (
                order_uid, track_number, entry,
                delivery_name, delivery_phone, delivery_zip, delivery_city,
                delivery_address, delivery_region, delivery_email,
                payment_transaction, payment_request_id, payment_currency,
                payment_provider, payment_amount, payment_payment_dt, payment_bank,
                payment_delivery_cost, payment_goods_total, payment_custom_fee,
                locale, internal_signature, customer_id, delivery_service,
                shardkey, sm_id, date_created, oof_shard
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28)
            ",
        )
        .bind(&order.order_uid)
        .bind(&order.track_number)
        .bind(&order.entry)
        .bind(&order.delivery.name)
        .bind(&order.delivery.phone)
        .bind(&order.delivery.zip)
        .bind(&order.delivery.city)
        .bind(&order.delivery.address)
        .bind(&order.delivery.region)
        .bind(&order.delivery.email)
        .bind(&order.payment.transaction)
        .bind(&order.payment.request_id)
        .bind(&order.payment.currency)
        .bind(&order.payment.provider)
        .bind(order.payment.amount)
        .bind(order.payment.payment_dt)
        .bind(&order.payment.bank)
        .bind(order.payment.delivery_cost)
        .bind(order.payment.goods_total)
        .bind(order.payment.custom_fee)
        .bind(&order.locale)
        .bind(&order.internal_signature)
        .bind(&order.customer_id)
        .bind(&order.delivery_service)
        .bind(&order.shardkey)
        .bind(order.sm_id)
        .bind(order.date_created)
        .bind(&order.oof_shard)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!(
                    "order {} already exists",
                    order.order_uid
                ));
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    /// Check database connectivity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database is unreachable.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(self.pool).await?;
        Ok(())
    }
}
