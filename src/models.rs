use serde::{Deserialize, Serialize};

use crate::money::{Money, Quantity};

/// A catalog product as supplied by the product collaborator
///
/// The engine never mutates catalog state; it only reads price, name
/// and availability when snapshotting an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Price in minor currency units
    pub price: Money,
    pub image_url: String,
    /// Discontinued products stay attached to historical orders but can
    /// no longer be ordered
    pub deleted: bool,
}

/// A cart line as supplied by the cart collaborator
///
/// Quantity is at least 1 while the line exists; updating a line to
/// zero deletes it on the cart side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub quantity: Quantity,
    pub product: Product,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicken() -> Product {
        Product {
            id: 1,
            name: "Fried Chicken".to_string(),
            price: Money::from_minor_units(10_000),
            image_url: "https://cdn.example.com/chicken.png".to_string(),
            deleted: false,
        }
    }

    /// Products keep the integer price shape on the wire
    #[test]
    fn test_product_serialization() {
        let json = serde_json::to_string(&chicken()).unwrap();

        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"name\":\"Fried Chicken\""));
        assert!(json.contains("\"price\":10000"));
        assert!(json.contains("\"image_url\":\"https://cdn.example.com/chicken.png\""));
        assert!(json.contains("\"deleted\":false"));
    }

    #[test]
    fn test_cart_item_deserialization() {
        let json = r#"{
            "id": 7,
            "quantity": 3,
            "product": {
                "id": 1,
                "name": "Fried Chicken",
                "price": 10000,
                "image_url": "https://cdn.example.com/chicken.png",
                "deleted": false
            }
        }"#;

        let item: CartItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.id, 7);
        assert_eq!(item.quantity.get(), 3);
        assert_eq!(item.product.price, Money::from_minor_units(10_000));
    }

    /// A zero cart quantity is rejected at the boundary, not deep in
    /// the pricing code
    #[test]
    fn test_cart_item_rejects_zero_quantity() {
        let json = r#"{
            "id": 7,
            "quantity": 0,
            "product": {
                "id": 1,
                "name": "Fried Chicken",
                "price": 10000,
                "image_url": "https://cdn.example.com/chicken.png",
                "deleted": false
            }
        }"#;

        let result: Result<CartItem, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
