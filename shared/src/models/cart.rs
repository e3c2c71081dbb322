//! Cart Model

use serde::{Deserialize, Serialize};

/// One cart line (also the order line snapshot)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub name: String,
    /// Unit price in cents at the time the line was added
    pub unit_price: i64,
    pub quantity: i64,
    /// unit_price × quantity
    pub subtotal: i64,
}

impl CartItem {
    pub fn new(product_id: i64, name: impl Into<String>, unit_price: i64, quantity: i64) -> Self {
        Self {
            product_id,
            name: name.into(),
            unit_price,
            quantity,
            subtotal: unit_price.saturating_mul(quantity),
        }
    }
}

/// Shopping cart, owned by a user or by a guest session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: i64,
    pub user_id: Option<i64>,
    pub session_id: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<CartItem>,
    pub subtotal: i64,
    pub updated_at: i64,
}

impl Cart {
    /// Unsaved empty cart (id 0)
    pub fn empty(user_id: Option<i64>, session_id: Option<String>) -> Self {
        Self {
            id: 0,
            user_id,
            session_id,
            items: Vec::new(),
            subtotal: 0,
            updated_at: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Recompute every line subtotal and the cart subtotal
    pub fn recompute(&mut self) {
        for item in &mut self.items {
            item.subtotal = item.unit_price.saturating_mul(item.quantity);
        }
        self.subtotal = self
            .items
            .iter()
            .fold(0i64, |total, i| total.saturating_add(i.subtotal));
    }

    /// Current quantity of a product in the cart (0 when absent)
    pub fn quantity_of(&self, product_id: i64) -> i64 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// Add `quantity` of a product, merging with an existing line.
    ///
    /// An existing line keeps its original unit price.
    pub fn add_item(&mut self, product_id: i64, name: &str, unit_price: i64, quantity: i64) {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self
                .items
                .push(CartItem::new(product_id, name, unit_price, quantity)),
        }
        self.recompute();
    }

    /// Set the quantity of an existing line. Returns the previous quantity.
    pub fn set_quantity(&mut self, product_id: i64, quantity: i64) -> Option<i64> {
        let item = self.items.iter_mut().find(|i| i.product_id == product_id)?;
        let previous = item.quantity;
        item.quantity = quantity;
        self.recompute();
        Some(previous)
    }

    /// Remove a line, returning it
    pub fn remove_item(&mut self, product_id: i64) -> Option<CartItem> {
        let pos = self.items.iter().position(|i| i.product_id == product_id)?;
        let removed = self.items.remove(pos);
        self.recompute();
        Some(removed)
    }

    /// Fold another cart's lines into this one
    pub fn merge_from(&mut self, other: &Cart) {
        for item in &other.items {
            self.add_item(item.product_id, &item.name, item.unit_price, item.quantity);
        }
    }
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItem {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Set-quantity payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartItem {
    pub quantity: i64,
}
