//! The order record exchanged between the relay, the resolver and the store.
//!
//! Field names match the JSON wire format exactly. Monetary and percentage
//! values are [`Decimal`] and travel as JSON numbers.
//!
//! Decoding is structural only: any field may be absent and takes its zero
//! value (empty string, `0`, the Unix epoch). Whether the record is usable is
//! up to the caller; the relay, for one, refuses to cache an empty `order_uid`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A complete order as issued by the store.
///
/// Orders are immutable once retrieved: the relay never merges or patches
/// them, it only replaces whole records keyed by [`Order::order_uid`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub order_uid: String,
    pub track_number: String,
    pub entry: String,
    pub delivery: Delivery,
    pub payment: Payment,
    /// Line items. The store row carries none, so this is often empty.
    pub items: Vec<Item>,
    pub locale: String,
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i32,
    pub date_created: DateTime<Utc>,
    pub oof_shard: String,
}

/// Delivery contact and address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Payment details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payment {
    pub transaction: String,
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Unix timestamp of the payment.
    pub payment_dt: i64,
    pub bank: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub goods_total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub custom_fee: Decimal,
}

/// A single line item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub chrt_id: i64,
    pub track_number: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub rid: String,
    pub name: String,
    /// Sale percentage.
    #[serde(with = "rust_decimal::serde::float")]
    pub sale: Decimal,
    pub size: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub nm_id: i64,
    pub brand: String,
    pub status: i32,
}

impl Order {
    /// Decode an order from a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the payload is not a structurally valid order.
    pub fn from_json(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }

    /// Encode the order as a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    /// Reference order document, items included.
    const SAMPLE: &str = r#"{
        "order_uid": "b563feb7b2b84b6test",
        "track_number": "WBILMTESTTRACK",
        "entry": "WBIL",
        "delivery": {
            "name": "Test Testov",
            "phone": "+9720000000",
            "zip": "2639809",
            "city": "Kiryat Mozkin",
            "address": "Ploshad Mira 15",
            "region": "Kraiot",
            "email": "test@gmail.com"
        },
        "payment": {
            "transaction": "b563feb7b2b84b6test",
            "request_id": "",
            "currency": "USD",
            "provider": "wbpay",
            "amount": 1817,
            "payment_dt": 1637907727,
            "bank": "alpha",
            "delivery_cost": 1500,
            "goods_total": 317,
            "custom_fee": 0
        },
        "items": [
            {
                "chrt_id": 9934930,
                "track_number": "WBILMTESTTRACK",
                "price": 453,
                "rid": "ab4219087a764ae0btest",
                "name": "Mascaras",
                "sale": 30,
                "size": "0",
                "total_price": 317,
                "nm_id": 2389212,
                "brand": "Vivienne Sabo",
                "status": 202
            }
        ],
        "locale": "en",
        "internal_signature": "",
        "customer_id": "test",
        "delivery_service": "meest",
        "shardkey": "9",
        "sm_id": 99,
        "date_created": "2021-11-26T06:22:19Z",
        "oof_shard": "1"
    }"#;

    fn item(chrt_id: i64, price: &str) -> Item {
        Item {
            chrt_id,
            track_number: "WBILMTESTTRACK".to_string(),
            price: Decimal::from_str(price).unwrap(),
            rid: format!("rid-{chrt_id}"),
            name: "Mascaras".to_string(),
            sale: Decimal::from_str("12.5").unwrap(),
            size: "0".to_string(),
            total_price: Decimal::from_str(price).unwrap(),
            nm_id: 2_389_212,
            brand: "Vivienne Sabo".to_string(),
            status: 202,
        }
    }

    #[test]
    fn test_decode_sample() {
        let order = Order::from_json(SAMPLE.as_bytes()).unwrap();

        assert_eq!(order.order_uid, "b563feb7b2b84b6test");
        assert_eq!(order.delivery.city, "Kiryat Mozkin");
        assert_eq!(order.payment.amount, Decimal::new(1817, 0));
        assert_eq!(order.payment.payment_dt, 1_637_907_727);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].sale, Decimal::new(30, 0));
        assert_eq!(order.sm_id, 99);
        assert_eq!(order.date_created.to_rfc3339(), "2021-11-26T06:22:19+00:00");
    }

    #[test]
    fn test_missing_items_decodes_as_empty() {
        let mut value: serde_json::Value = serde_json::from_str(SAMPLE).unwrap();
        value.as_object_mut().unwrap().remove("items");

        let order: Order = serde_json::from_value(value).unwrap();
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_round_trip_with_zero_one_and_many_items() {
        let base = Order::from_json(SAMPLE.as_bytes()).unwrap();

        for items in [
            vec![],
            vec![item(1, "453")],
            vec![item(1, "453"), item(2, "0.99"), item(3, "1200.05")],
        ] {
            let order = Order {
                items,
                ..base.clone()
            };
            let decoded = Order::from_json(&order.to_json().unwrap()).unwrap();
            assert_eq!(decoded, order);
        }
    }

    #[test]
    fn test_fractional_amounts_survive_round_trip() {
        let mut order = Order::from_json(SAMPLE.as_bytes()).unwrap();
        order.payment.amount = Decimal::from_str("18.17").unwrap();
        order.payment.custom_fee = Decimal::from_str("0.1").unwrap();

        let decoded = Order::from_json(&order.to_json().unwrap()).unwrap();
        assert_eq!(decoded.payment.amount, order.payment.amount);
        assert_eq!(decoded.payment.custom_fee, order.payment.custom_fee);
    }

    #[test]
    fn test_partial_order_decodes_with_zero_values() {
        let order = Order::from_json(br#"{"order_uid": "abc", "payment": {"amount": 12.5}}"#).unwrap();

        assert_eq!(order.order_uid, "abc");
        assert_eq!(order.payment.amount, Decimal::from_str("12.5").unwrap());
        assert_eq!(order.payment.currency, "");
        assert_eq!(order.delivery, Delivery::default());
        assert_eq!(order.date_created.timestamp(), 0);
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        assert!(Order::from_json(br#"{"order_uid": 42}"#).is_err());
    }

    #[test]
    fn test_decode_rejects_bare_identifier() {
        assert!(Order::from_json(b"b563feb7b2b84b6test").is_err());
    }
}
