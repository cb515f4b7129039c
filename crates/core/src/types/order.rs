//! Order history records.

use serde::{Deserialize, Serialize};

use crate::{Medicine, OrderId, OrderStatus, Price};

/// A line inside an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub medicine: Medicine,
    pub quantity: u32,
}

/// An order as returned by `GET /orders`.
///
/// A review submitted for the order is recorded by the API only; the local
/// snapshot keeps `review_given == false` until the orders are fetched again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    #[serde(default)]
    pub address: String,
    pub total_price: Price,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub review_given: bool,
}

impl Order {
    /// Whether the customer can still leave a review for this order.
    #[must_use]
    pub fn is_reviewable(&self) -> bool {
        self.status == OrderStatus::Delivered && !self.review_given
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order(status: &str, review_given: Option<bool>) -> Order {
        let mut json = serde_json::json!({
            "id": 5,
            "status": status,
            "address": "House 12, Road 4, Dhaka",
            "totalPrice": 120,
            "items": [{"medicine": {"id": 1, "name": "Seclo", "price": 60}, "quantity": 2}]
        });
        if let Some(given) = review_given {
            json["reviewGiven"] = serde_json::Value::Bool(given);
        }
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_delivered_without_review_is_reviewable() {
        assert!(order("DELIVERED", Some(false)).is_reviewable());
    }

    #[test]
    fn test_missing_review_flag_means_not_given() {
        assert!(order("DELIVERED", None).is_reviewable());
    }

    #[test]
    fn test_reviewed_order_is_not_reviewable() {
        assert!(!order("DELIVERED", Some(true)).is_reviewable());
    }

    #[test]
    fn test_undelivered_order_is_not_reviewable() {
        for status in ["PLACED", "PROCESSING", "SHIPPED"] {
            assert!(!order(status, Some(false)).is_reviewable(), "{status}");
        }
    }

    #[test]
    fn test_decode_items() {
        let order = order("SHIPPED", None);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_price, Price::from_cents(12000));
    }
}
