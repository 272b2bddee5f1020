//! Cart Aggregate
//!
//! The shopper's order-in-progress. A cart is owned by exactly one browsing
//! session and is only ever mutated through the methods below, which keep
//! three invariants after every call:
//!
//! - each product id appears at most once, in first-added order;
//! - every line has a quantity of at least one;
//! - a line's name, price and variant never change after it is added.
//!
//! Totals are derived on every read and never stored. A mutation that would
//! take the exact price total past `u64::MAX` is refused and leaves the cart
//! as it was, so the derived total is always the exact sum.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::domain::value_objects::{Money, Quantity};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub image: String,
    pub quantity: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
}

impl CartLine {
    /// `None` when price times quantity does not fit in `u64`.
    pub fn line_total(&self) -> Option<u64> { self.price.checked_mul(u64::from(self.quantity.get())) }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("cart total would exceed the largest {currency} amount")]
    TotalOverflow { currency: String },
}

/// What the catalog hands over when a shopper adds a product.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineInput {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub image: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
}

impl CartLineInput {
    fn into_line(self, quantity: Quantity) -> CartLine {
        CartLine {
            id: self.id, name: self.name, price: self.price, image: self.image,
            quantity, color: self.color, length: self.length,
        }
    }
}

/// Whether the cart overlay is shown. Independent of the cart contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartVisibility {
    #[default]
    Closed,
    Open,
}

/// Item count and price observed together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub total_items: u64,
    pub total_price: Money,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartLine>,
    visibility: CartVisibility,
    currency: String,
}

impl Cart {
    pub fn new(currency: &str) -> Self {
        Self { items: vec![], visibility: CartVisibility::Closed, currency: currency.to_string() }
    }

    pub fn items(&self) -> &[CartLine] { &self.items }
    pub fn line(&self, id: &str) -> Option<&CartLine> { self.items.iter().find(|i| i.id == id) }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn visibility(&self) -> CartVisibility { self.visibility }
    pub fn is_open(&self) -> bool { self.visibility == CartVisibility::Open }

    /// Adds one unit. A known id only has its quantity bumped; the rest of
    /// the incoming input is ignored.
    pub fn add_item(&mut self, input: CartLineInput) -> Result<(), CartError> {
        match self.position(&input.id) {
            Some(at) => {
                let quantity = self.items[at].quantity.increment();
                self.replace_quantity(at, quantity)
            }
            None => self.push_line(input.into_line(Quantity::ONE)),
        }
    }

    /// Returns whether a line was removed.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> Result<(), CartError> {
        self.set_quantity(id, Quantity::from_i64(quantity))
    }

    /// `None` removes the line. Unknown ids are ignored.
    pub fn set_quantity(&mut self, id: &str, quantity: Option<Quantity>) -> Result<(), CartError> {
        match (quantity, self.position(id)) {
            (None, _) => { self.remove_item(id); Ok(()) }
            (Some(q), Some(at)) => self.replace_quantity(at, q),
            (Some(_), None) => Ok(()),
        }
    }

    fn position(&self, id: &str) -> Option<usize> { self.items.iter().position(|i| i.id == id) }

    fn exact_price(&self) -> Option<u64> {
        self.items.iter().try_fold(0u64, |sum, line| sum.checked_add(line.line_total()?))
    }

    fn overflow(&self) -> CartError { CartError::TotalOverflow { currency: self.currency.clone() } }

    fn push_line(&mut self, line: CartLine) -> Result<(), CartError> {
        self.items.push(line);
        if self.exact_price().is_none() {
            self.items.pop();
            return Err(self.overflow());
        }
        Ok(())
    }

    fn replace_quantity(&mut self, at: usize, quantity: Quantity) -> Result<(), CartError> {
        let previous = std::mem::replace(&mut self.items[at].quantity, quantity);
        if self.exact_price().is_none() {
            self.items[at].quantity = previous;
            return Err(self.overflow());
        }
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); }

    pub fn open(&mut self) { self.visibility = CartVisibility::Open; }
    pub fn close(&mut self) { self.visibility = CartVisibility::Closed; }
    pub fn toggle(&mut self) {
        self.visibility = match self.visibility {
            CartVisibility::Open => CartVisibility::Closed,
            CartVisibility::Closed => CartVisibility::Open,
        };
    }

    pub fn total_items(&self) -> u64 { self.totals().total_items }
    pub fn total_price(&self) -> Money { self.totals().total_price }

    pub fn totals(&self) -> CartTotals {
        let count = self.items.iter().fold(0u64, |count, line| count.saturating_add(u64::from(line.quantity.get())));
        let price = self.exact_price().unwrap_or(u64::MAX);
        CartTotals { total_items: count, total_price: Money::new(price, &self.currency) }
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.iter().map(SnapshotLine::from).collect(),
            is_open: self.is_open(),
        }
    }

    /// Rebuilds a cart from a stored snapshot, which may have been edited
    /// by hand. Lines below one unit are dropped and repeated ids fold into
    /// the first occurrence. A line that would overflow the total is skipped.
    pub fn restore(snapshot: CartSnapshot, currency: &str) -> Self {
        let mut cart = Self::new(currency);
        for line in snapshot.items {
            let Some(quantity) = Quantity::from_i64(line.quantity) else { continue };
            let _ = match cart.position(&line.input.id) {
                Some(at) => {
                    let merged = cart.items[at].quantity.saturating_add(quantity);
                    cart.replace_quantity(at, merged)
                }
                None => cart.push_line(line.input.into_line(quantity)),
            };
        }
        if snapshot.is_open { cart.open(); }
        cart
    }
}

/// Serialized cart for reload survival.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<SnapshotLine>,
    #[serde(default)]
    pub is_open: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLine {
    #[serde(flatten)]
    pub input: CartLineInput,
    pub quantity: i64,
}

impl From<&CartLine> for SnapshotLine {
    fn from(line: &CartLine) -> Self {
        Self {
            input: CartLineInput {
                id: line.id.clone(), name: line.name.clone(), price: line.price,
                image: line.image.clone(), color: line.color.clone(), length: line.length.clone(),
            },
            quantity: i64::from(line.quantity.get()),
        }
    }
}
