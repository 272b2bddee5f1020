//! Per-session cart ownership.
//!
//! Each browsing session owns exactly one [`Cart`]; handlers reach it only
//! through [`CartSessions::with_cart`], which serialises access per process.
//! A session ends when its cart sits idle past the configured TTL; expired
//! carts are dropped on the next write.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use crate::domain::aggregates::cart::{Cart, CartSnapshot};

const MAX_SESSION_ID_LEN: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartSessionError {
    #[error("session id must be 1-128 characters of letters, digits, '-' or '_'")]
    InvalidSessionId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn parse(raw: &str) -> Result<Self, CartSessionError> {
        let ok = !raw.is_empty()
            && raw.len() <= MAX_SESSION_ID_LEN
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if ok { Ok(Self(raw.to_string())) } else { Err(CartSessionError::InvalidSessionId) }
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

struct Held {
    cart: Cart,
    last_seen: DateTime<Utc>,
}

pub struct CartSessions {
    currency: String,
    idle_ttl: Duration,
    carts: RwLock<HashMap<SessionId, Held>>,
}

/// An empty, closed cart carries no state worth keeping.
fn is_pristine(cart: &Cart) -> bool { cart.is_empty() && !cart.is_open() }

impl CartSessions {
    pub fn new(currency: &str, idle_ttl: Duration) -> Self {
        Self { currency: currency.to_string(), idle_ttl, carts: RwLock::new(HashMap::new()) }
    }

    fn cutoff(&self) -> DateTime<Utc> { Utc::now() - self.idle_ttl }

    /// Runs `f` against the session's cart, starting from an empty one if the
    /// session has none. The cart is only kept if `f` leaves something in it.
    pub async fn with_cart<R>(&self, session: &SessionId, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut carts = self.carts.write().await;
        let cutoff = self.cutoff();
        let before = carts.len();
        carts.retain(|_, held| held.last_seen > cutoff);
        if carts.len() < before {
            tracing::debug!(expired = before - carts.len(), "idle carts discarded");
        }

        let mut cart = carts.remove(session).map(|held| held.cart).unwrap_or_else(|| Cart::new(&self.currency));
        let result = f(&mut cart);
        if !is_pristine(&cart) {
            carts.insert(session.clone(), Held { cart, last_seen: Utc::now() });
        }
        result
    }

    /// Read-only view; sessions without a live cart read as an empty one.
    pub async fn read<R>(&self, session: &SessionId, f: impl FnOnce(&Cart) -> R) -> R {
        let carts = self.carts.read().await;
        match carts.get(session) {
            Some(held) if held.last_seen > self.cutoff() => f(&held.cart),
            _ => f(&Cart::new(&self.currency)),
        }
    }

    pub async fn restore(&self, session: &SessionId, snapshot: CartSnapshot) -> Cart {
        let cart = Cart::restore(snapshot, &self.currency);
        self.with_cart(session, |current| { *current = cart.clone(); }).await;
        cart
    }

    /// Number of sessions holding a live cart.
    pub async fn active(&self) -> usize {
        let cutoff = self.cutoff();
        self.carts.read().await.values().filter(|held| held.last_seen > cutoff).count()
    }

    #[cfg(test)]
    async fn idle_all(&self, by: Duration) {
        for held in self.carts.write().await.values_mut() { held.last_seen = held.last_seen - by; }
    }
}
