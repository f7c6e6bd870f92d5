use crate::model::{CartItem, ProductIdentifier};
use serde::{Deserialize, Serialize};

/// Which of the two carts a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CartScope {
    Auth,
    Guest,
}

/// The signed-in cart mirrored from the server, plus the local guest cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    #[serde(default)]
    pub auth_items: Vec<CartItem>,
    #[serde(default)]
    pub guest_items: Vec<CartItem>,
}

impl CartState {
    fn items_mut(&mut self, scope: CartScope) -> &mut Vec<CartItem> {
        match scope {
            CartScope::Auth => &mut self.auth_items,
            CartScope::Guest => &mut self.guest_items,
        }
    }

    pub fn items(&self, scope: CartScope) -> &[CartItem] {
        match scope {
            CartScope::Auth => &self.auth_items,
            CartScope::Guest => &self.guest_items,
        }
    }

    /// Records an added item. The server reports the resulting quantity, so
    /// auth lines take it as is; guest lines accumulate.
    pub fn apply_added(&mut self, item: CartItem, scope: CartScope) {
        let items = self.items_mut(scope);
        match items
            .iter_mut()
            .find(|existing| existing.product_identifier == item.product_identifier)
        {
            Some(existing) => match scope {
                CartScope::Auth => existing.quantity = item.quantity,
                CartScope::Guest => existing.quantity = existing.quantity.saturating_add(item.quantity),
            },
            None => items.push(item),
        }
    }

    /// Removes a line, looking in the auth cart first. Returns whether one was found.
    pub fn remove(&mut self, product: ProductIdentifier) -> bool {
        for scope in [CartScope::Auth, CartScope::Guest] {
            let items = self.items_mut(scope);
            if let Some(index) = items.iter().position(|i| i.product_identifier == product) {
                items.remove(index);
                return true;
            }
        }
        false
    }

    /// Sets a line's quantity, looking in the auth cart first.
    pub fn update_quantity(&mut self, product: ProductIdentifier, quantity: u32) -> bool {
        for scope in [CartScope::Auth, CartScope::Guest] {
            if let Some(item) = self
                .items_mut(scope)
                .iter_mut()
                .find(|i| i.product_identifier == product)
            {
                item.quantity = quantity;
                return true;
            }
        }
        false
    }

    pub fn clear(&mut self, scope: CartScope) {
        self.items_mut(scope).clear();
    }

    /// Installs a merge result.
    pub fn replace_auth(&mut self, items: Vec<CartItem>) {
        self.auth_items = items;
        self.guest_items.clear();
    }

    pub fn reset(&mut self) {
        self.auth_items.clear();
        self.guest_items.clear();
    }

    pub fn total_quantity(&self) -> u64 {
        self.auth_items
            .iter()
            .chain(&self.guest_items)
            .map(|item| u64::from(item.quantity))
            .sum()
    }
}
