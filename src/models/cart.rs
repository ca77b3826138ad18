use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Dish, Restaurant};

/// One cart entry: a dish, the restaurant it was ordered from and a quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub dish: Dish,
    pub restaurant: Restaurant,
    pub quantity: u32,
}

/// Immutable cart state.
///
/// Every transition returns a new `Cart` with `version` incremented, so a
/// published value is never changed behind an observer's back. Line items are
/// unique by dish id and kept in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cart {
    version: u64,
    items: Vec<LineItem>,
}

/// Summary handed back when an order is validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_id: Uuid,
    pub items: Vec<LineItem>,
    pub total_items: u64,
    pub total_price: Decimal,
    pub placed_at: DateTime<Utc>,
}

impl LineItem {
    pub fn new(dish: Dish, restaurant: Restaurant) -> Self {
        Self {
            dish,
            restaurant,
            quantity: 1,
        }
    }

    pub fn dish_id(&self) -> i64 {
        self.dish.id
    }

    /// Get the total price for this line (price * quantity)
    pub fn total_price(&self) -> Decimal {
        self.dish.price * Decimal::from(self.quantity)
    }
}

impl Cart {
    /// Create an empty cart at version 0
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    fn next(&self, items: Vec<LineItem>) -> Self {
        Self {
            version: self.version + 1,
            items,
        }
    }

    /// Add one unit of a dish, appending a new line if the dish is not in the cart yet
    pub fn with_item_added(&self, dish: Dish, restaurant: Restaurant) -> Self {
        let mut items = self.items.clone();
        match items.iter_mut().find(|item| item.dish.id == dish.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => items.push(LineItem::new(dish, restaurant)),
        }
        self.next(items)
    }

    /// Drop the line for a dish; unknown ids leave the items untouched
    pub fn with_item_removed(&self, dish_id: i64) -> Self {
        let items = self
            .items
            .iter()
            .filter(|item| item.dish.id != dish_id)
            .cloned()
            .collect();
        self.next(items)
    }

    /// Set the quantity of an existing line. Returns `None` when the dish is not in the cart.
    pub fn with_quantity(&self, dish_id: i64, quantity: u32) -> Option<Self> {
        if !self.contains_item(dish_id) {
            return None;
        }
        if quantity == 0 {
            return Some(self.with_item_removed(dish_id));
        }

        let items = self
            .items
            .iter()
            .map(|item| {
                if item.dish.id == dish_id {
                    LineItem {
                        quantity,
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Some(self.next(items))
    }

    pub fn cleared(&self) -> Self {
        self.next(Vec::new())
    }

    /// Get the total number of units in the cart
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Get the total price of all lines in the cart
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(LineItem::total_price).sum()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_item(&self, dish_id: i64) -> Option<&LineItem> {
        self.items.iter().find(|item| item.dish.id == dish_id)
    }

    pub fn contains_item(&self, dish_id: i64) -> bool {
        self.items.iter().any(|item| item.dish.id == dish_id)
    }

    pub fn get_item_quantity(&self, dish_id: i64) -> u32 {
        self.get_item(dish_id).map(|item| item.quantity).unwrap_or(0)
    }
}

impl OrderConfirmation {
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            items: cart.items().to_vec(),
            total_items: cart.total_items(),
            total_price: cart.total_price(),
            placed_at: Utc::now(),
        }
    }
}
