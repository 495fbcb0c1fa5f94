//! Product data as the register sees it.

use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Product status in the store catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Product is in draft mode, not visible to customers.
    Draft,
    /// Product is active and can be sold.
    #[default]
    Active,
    /// Product is archived, not visible but data preserved.
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Archived => "archived",
        }
    }
}

/// A product row supplied by the store catalog.
///
/// `available_stock` is the quantity the register may sell right now; the
/// cart engine copies it onto each line and bounds quantities by it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogProduct {
    /// Product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Price per unit.
    pub unit_price: Money,
    /// Units available for sale.
    pub available_stock: i64,
    /// Catalog status.
    #[serde(default)]
    pub status: ProductStatus,
}

impl CatalogProduct {
    /// Create an active product.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Money,
        available_stock: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            available_stock,
            status: ProductStatus::Active,
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the register may offer this product at all.
    pub fn is_sellable(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// Whether at least one unit is in stock.
    pub fn in_stock(&self) -> bool {
        self.available_stock > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Currency;

    #[test]
    fn test_sellable() {
        let p = CatalogProduct::new("p1", "Mug", Money::new(999, Currency::USD), 3);
        assert!(p.is_sellable());
        assert!(p.in_stock());

        let archived = p.with_status(ProductStatus::Archived);
        assert!(!archived.is_sellable());
    }

    #[test]
    fn test_status_defaults_to_active() {
        let json = r#"{"id":"p1","name":"Mug","unit_price":{"amount_cents":999,"currency":"USD"},"available_stock":0}"#;
        let p: CatalogProduct = serde_json::from_str(json).unwrap();
        assert_eq!(p.status, ProductStatus::Active);
        assert!(!p.in_stock());
    }
}
