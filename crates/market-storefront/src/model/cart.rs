use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend primary key of a product; also the cart line key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductIdentifier(pub u64);

impl fmt::Display for ProductIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductIdentifier {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// One cart line.
///
/// Guest items carry whatever the product page knew; server items are
/// authoritative. `price` is the snapshot taken when the item was added and
/// arrives as a decimal string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_identifier: ProductIdentifier,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<String>,
}

impl CartItem {
    pub fn new(product_identifier: impl Into<ProductIdentifier>, quantity: u32) -> Self {
        Self {
            product_identifier: product_identifier.into(),
            quantity,
            price: None,
            name: None,
            image: None,
            date_added: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// This item with every field the server confirmed written over it.
    pub fn overlay(&self, server: &CartItem) -> CartItem {
        CartItem {
            product_identifier: server.product_identifier,
            quantity: server.quantity,
            price: server.price.or(self.price),
            name: server.name.clone().or_else(|| self.name.clone()),
            image: server.image.clone().or_else(|| self.image.clone()),
            date_added: server.date_added.clone().or_else(|| self.date_added.clone()),
        }
    }
}
