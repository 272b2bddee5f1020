//! LuxeWig storefront
//!
//! Wig e-commerce service: a public catalog, per-session shopping carts, a
//! three-step checkout and an admin back-office for the catalog and orders.
//!
//! ## Features
//! - Cart engine with derived totals and reload snapshots
//! - Checkout summary with flat shipping and step validation
//! - Wig catalog with filtering, sorting and pagination
//! - Admin authentication and order tracking
//! - Postgres or in-memory catalog storage

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod events;
pub mod orders;
pub mod sessions;

use thiserror::Error;
use uuid::Uuid;

pub use config::AppConfig;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("wig {0} not found")]
    WigNotFound(Uuid),

    #[error("order {0} not found")]
    OrderNotFound(Uuid),

    #[error("slug `{0}` is already used by another wig")]
    DuplicateSlug(String),

    #[error(transparent)]
    Wig(#[from] domain::aggregates::WigError),

    #[error(transparent)]
    Order(#[from] domain::aggregates::OrderError),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
