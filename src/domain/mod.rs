//! Storefront domain: cart engine, checkout, orders and the wig catalog.
pub mod aggregates;
pub mod events;
pub mod validation;
pub mod value_objects;
