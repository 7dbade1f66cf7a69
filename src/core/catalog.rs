//! Read-only product catalog.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    #[serde(rename = "price", with = "rust_decimal::serde::float")]
    pub unit_price_czk: Decimal,
}

impl Product {
    pub fn new(id: u32, name: &str, unit_price_czk: Decimal) -> Self {
        Self {
            id,
            name: name.to_string(),
            unit_price_czk,
        }
    }
}

pub trait Catalog: Send + Sync {
    /// All products, in insertion order.
    fn list_products(&self) -> &[Product];

    fn find_product(&self, id: i64) -> Option<&Product> {
        self.list_products()
            .iter()
            .find(|p| i64::from(p.id) == id)
    }
}

/// Catalog backed by a fixed product list.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The shop's default assortment, priced in CZK.
    pub fn seeded() -> Self {
        Self::from_products(vec![
            Product::new(1, "Káva 250g", Decimal::from(199)),
            Product::new(2, "Hrnek", Decimal::from(149)),
            Product::new(3, "Tričko", Decimal::from(399)),
        ])
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Catalog for StaticCatalog {
    fn list_products(&self) -> &[Product] {
        &self.products
    }
}
