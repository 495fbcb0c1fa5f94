//! Product catalog lookup.
//!
//! The catalog lives in the hosted store database. The register only needs
//! to resolve ids to name, price and stock, which the [`Catalog`] trait
//! describes. [`InMemoryCatalog`] serves tests and scripted sessions.

mod product;

pub use product::{CatalogProduct, ProductStatus};

use crate::ids::ProductId;
use crate::CommerceError;
use serde::{Deserialize, Serialize};

/// Source of product data for the register.
pub trait Catalog {
    /// Look up a product by id.
    fn product(&self, id: &ProductId) -> Option<CatalogProduct>;

    /// Look up a product, failing if it is unknown.
    fn require(&self, id: &ProductId) -> Result<CatalogProduct, CommerceError> {
        self.product(id)
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }
}

/// Catalog held in memory, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InMemoryCatalog {
    products: Vec<CatalogProduct>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from a JSON array of products.
    pub fn from_json(json: &str) -> Result<Self, CommerceError> {
        let products: Vec<CatalogProduct> = serde_json::from_str(json)?;
        Ok(Self::from_iter(products))
    }

    /// Insert or replace a product.
    pub fn upsert(&mut self, product: CatalogProduct) {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => self.products.push(product),
        }
    }

    /// Remove a product.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let len_before = self.products.len();
        self.products.retain(|p| &p.id != id);
        self.products.len() < len_before
    }

    /// Set the available stock of a product.
    pub fn set_stock(&mut self, id: &ProductId, available_stock: i64) -> bool {
        match self.products.iter_mut().find(|p| &p.id == id) {
            Some(p) => {
                p.available_stock = available_stock;
                true
            }
            None => false,
        }
    }

    /// All products.
    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<CatalogProduct> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogProduct>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for product in iter {
            catalog.upsert(product);
        }
        catalog
    }
}

impl Catalog for InMemoryCatalog {
    fn product(&self, id: &ProductId) -> Option<CatalogProduct> {
        self.products.iter().find(|p| &p.id == id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Currency, Money};

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_iter([
            CatalogProduct::new("p1", "Coffee Mug", Money::new(999, Currency::USD), 3),
            CatalogProduct::new("p2", "Tea Towel", Money::new(550, Currency::USD), 10),
            CatalogProduct::new("p3", "Old Mug", Money::new(100, Currency::USD), 1)
                .with_status(ProductStatus::Archived),
        ])
    }

    #[test]
    fn test_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.product(&ProductId::new("p2")).unwrap().name, "Tea Towel");
        assert!(catalog.product(&ProductId::new("nope")).is_none());
        assert!(matches!(
            catalog.require(&ProductId::new("nope")),
            Err(CommerceError::ProductNotFound(_))
        ));
    }

    #[test]
    fn test_status_survives_lookup() {
        let catalog = catalog();
        let old = catalog.product(&ProductId::new("p3")).unwrap();
        assert_eq!(old.status, ProductStatus::Archived);
        assert!(!old.is_sellable());
    }

    #[test]
    fn test_upsert_replaces() {
        let mut catalog = catalog();
        catalog.upsert(CatalogProduct::new("p1", "Big Mug", Money::new(1299, Currency::USD), 5));
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.product(&ProductId::new("p1")).unwrap().name, "Big Mug");
    }

    #[test]
    fn test_from_json() {
        let json = r#"[{"id":"p9","name":"Candle","unit_price":{"amount_cents":1500,"currency":"USD"},"available_stock":4}]"#;
        let catalog = InMemoryCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.product(&ProductId::new("p9")).unwrap().available_stock, 4);
    }
}
