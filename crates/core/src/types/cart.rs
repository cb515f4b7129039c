//! Cart contents.

use serde::{Deserialize, Serialize};

use crate::{CartItemId, MedicineId, Price};

/// The medicine summary embedded in cart items and order lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: MedicineId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One line of the visitor's cart, as returned by `GET /cart`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub medicine: Medicine,
    pub quantity: u32,
}

impl CartItem {
    /// Price of the whole line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.medicine.price.times(self.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        let json = r#"{"id":9,"medicine":{"id":4,"name":"Napa","price":2.5},"quantity":4}"#;
        let item: CartItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.line_total(), Price::from_cents(1000));
        assert_eq!(item.line_total().to_string(), "$10.00");
        assert_eq!(item.medicine.image, None);
    }
}
