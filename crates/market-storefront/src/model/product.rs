use super::ProductIdentifier;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Catalogue entry as served by the products viewset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_identifier: ProductIdentifier,
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_lbs: Option<Decimal>,
    #[serde(default = "default_quantity")]
    pub default_quantity: u32,
    #[serde(default)]
    pub stock: i64,
    /// Free-form JSON on the backend.
    #[serde(default)]
    pub tags: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

/// Query string for product listings, passed through as-is.
pub type ProductQuery = Vec<(String, String)>;

/// One page of the product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    /// Matches across all pages.
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Product>,
}

impl ProductPage {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
