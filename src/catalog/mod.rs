//! Wig catalog: listing queries and storage adapters.
pub mod postgres;
pub mod query;
pub mod repository;

pub use postgres::PgWigRepository;
pub use query::{ListParams, Pagination, Scope, WigPage, WigQuery};
pub use repository::{InMemoryWigRepository, WigRepository};
