//! Common data types for persistence
//!
//! Shared types used across the data module.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Product - Snapshot of a catalog entry
// =============================================================================

/// A product as shown in the catalog
///
/// The catalog owns the full shape. Only `id` matters to the stores; the
/// known display fields are typed and anything else is kept verbatim in
/// `extra`, so a stored snapshot round-trips unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique catalog identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Unit price in the store currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Product image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Catalog category (e.g., "Pain Relief")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Manufacturer or brand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Remaining catalog fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create a product with minimal info
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: None,
            image_url: None,
            category: None,
            brand: None,
            extra: Map::new(),
        }
    }

    /// Set price
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Set image URL
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Set category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set brand
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Attach an arbitrary catalog field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_builder() {
        let product = Product::new("sku-1", "Ibuprofen 200mg")
            .with_price(4.99)
            .with_category("Pain Relief")
            .with_brand("Generic");

        assert_eq!(product.id, "sku-1");
        assert_eq!(product.price, Some(4.99));
        assert_eq!(product.category.as_deref(), Some("Pain Relief"));
        assert_eq!(product.brand.as_deref(), Some("Generic"));
        assert!(product.image_url.is_none());
    }

    #[test]
    fn test_product_preserves_unknown_fields() {
        let raw = json!({
            "id": "sku-9",
            "name": "Vitamin D3",
            "price": 12.5,
            "stock": 40,
            "requires_prescription": false
        });

        let product: Product = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(product.extra.get("stock"), Some(&json!(40)));

        let back = serde_json::to_value(&product).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_product_only_id_required() {
        let product: Product = serde_json::from_value(json!({"id": "x"})).unwrap();
        assert_eq!(product.id, "x");
        assert!(product.name.is_empty());

        assert!(serde_json::from_value::<Product>(json!({"name": "no id"})).is_err());
    }
}
