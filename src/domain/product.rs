use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::CategoryId;

pub type ProductId = u64;

/// Represents a product in the catalog.
///
/// `stock` never goes below zero: it is only decremented through the inventory
/// ledger's conditional reserve.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

impl ProductCreate {
    pub fn new(name: impl Into<String>, price: Decimal, stock: u32) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            stock,
            category_id: None,
        }
    }

    pub fn in_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

/// Payload for updating an existing product. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
    /// `Some(None)` (an explicit `null`) moves the product out of its category.
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<CategoryId>>,
}

/// Maps a field that is present in the payload to `Some`, so `null` survives as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Conjunctive row filter; `None` fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    pub category_id: Option<CategoryId>,
}
