//! Value Objects for the storefront

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

/// Money value object.
///
/// Amounts are whole base-currency units (FCFA has no minor unit), so every
/// computation stays in integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: u64, currency: String }

impl Money {
    pub fn new(amount: u64, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn xof(amount: u64) -> Self { Self::new(amount, "XOF") }
    pub fn zero(currency: &str) -> Self { Self::new(0, currency) }
    pub fn amount(&self) -> u64 { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency { return Err(MoneyError::CurrencyMismatch); }
        Ok(Money::new(self.amount.saturating_add(other.amount), &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount.saturating_mul(u64::from(qty)), &self.currency) }
}

impl Default for Money { fn default() -> Self { Self::zero("XOF") } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{} {}", self.amount, self.currency) }
}

#[derive(Debug, Clone)] pub enum MoneyError { CurrencyMismatch }
impl std::error::Error for MoneyError {}
impl fmt::Display for MoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Currency mismatch") }
}

/// Quantity of one cart line. Never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(NonZeroU32);

impl Quantity {
    pub const ONE: Quantity = Quantity(NonZeroU32::MIN);

    pub fn new(value: u32) -> Option<Self> { NonZeroU32::new(value).map(Self) }

    /// Integer request; anything below one means "no line".
    pub fn from_i64(value: i64) -> Option<Self> {
        if value <= 0 { return None; }
        Self::new(u32::try_from(value).unwrap_or(u32::MAX))
    }

    /// Lenient numeric request as it arrives from a client.
    ///
    /// NaN and infinities are treated like zero. Fractions truncate toward
    /// zero, so `0.9` removes the line and `2.7` keeps two. Values past
    /// `u32::MAX` saturate.
    pub fn from_requested(value: f64) -> Option<Self> {
        if !value.is_finite() { return None; }
        let whole = value.trunc();
        if whole < 1.0 { return None; }
        if whole >= f64::from(u32::MAX) { return Self::new(u32::MAX); }
        Self::new(whole as u32)
    }

    pub fn get(&self) -> u32 { self.0.get() }
    pub fn increment(&self) -> Self { Self(self.0.saturating_add(1)) }
    pub fn saturating_add(&self, other: Quantity) -> Self { Self(self.0.saturating_add(other.get())) }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// URL slug derived from a display name
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Lowercases, collapses every run of characters outside `[a-z0-9]`
    /// into one `-` and trims dashes at both ends.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut out = String::with_capacity(name.len());
        let mut pending_dash = false;
        for c in name.chars().flat_map(char::to_lowercase) {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                if pending_dash && !out.is_empty() { out.push('-'); }
                pending_dash = false;
                out.push(c);
            } else {
                pending_dash = true;
            }
        }
        if out.is_empty() { return Err(SlugError::Empty); }
        Ok(Self(out))
    }

    /// Accepts an explicit slug, normalising it the same way.
    pub fn new(value: &str) -> Result<Self, SlugError> { Self::from_name(value) }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone)] pub enum SlugError { Empty }
impl std::error::Error for SlugError {}
impl fmt::Display for SlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Slug has no usable characters") }
}
