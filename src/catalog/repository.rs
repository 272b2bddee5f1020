//! Wig repository port and the in-process adapter.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;
use crate::catalog::query::{Pagination, WigPage, WigQuery};
use crate::domain::aggregates::wig::{Wig, WigChange};
use crate::{Result, StoreError};

/// Persistence for the wig catalog.
///
/// Implementations never keep pending domain events; callers drain them
/// from the aggregate before or after saving.
#[async_trait]
pub trait WigRepository: Send + Sync {
    /// Stores a new wig.
    ///
    /// # Errors
    ///
    /// - `DuplicateSlug` if another wig already uses the slug
    async fn insert(&self, wig: &Wig) -> Result<()>;

    /// Applies `change` to the stored wig atomically and returns the result,
    /// carrying the events it raised. Nothing is written when the change
    /// raises none.
    ///
    /// # Errors
    ///
    /// - `WigNotFound` if the id is unknown
    /// - `Wig` if the change is rejected
    async fn modify(&self, id: Uuid, change: WigChange) -> Result<Wig>;

    async fn find(&self, id: Uuid) -> Result<Option<Wig>>;

    /// Returns whether a wig was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn list(&self, query: &WigQuery) -> Result<WigPage>;

    /// Atomically takes `quantity` units out of stock and returns the
    /// updated wig, carrying its `StockDecremented` event.
    async fn decrement_stock(&self, id: Uuid, quantity: u32) -> Result<Wig>;
}

#[derive(Default)]
pub struct InMemoryWigRepository {
    wigs: RwLock<HashMap<Uuid, Wig>>,
}

impl InMemoryWigRepository {
    pub fn new() -> Self { Self::default() }
}

fn stored(wig: &Wig) -> Wig {
    let mut copy = wig.clone();
    copy.events.clear();
    copy
}

#[async_trait]
impl WigRepository for InMemoryWigRepository {
    async fn insert(&self, wig: &Wig) -> Result<()> {
        let mut wigs = self.wigs.write().await;
        if wigs.values().any(|w| w.slug() == wig.slug()) {
            return Err(StoreError::DuplicateSlug(wig.slug().to_string()));
        }
        wigs.insert(wig.id, stored(wig));
        Ok(())
    }

    async fn modify(&self, id: Uuid, change: WigChange) -> Result<Wig> {
        let mut wigs = self.wigs.write().await;
        let slot = wigs.get_mut(&id).ok_or(StoreError::WigNotFound(id))?;
        let mut wig = slot.clone();
        wig.change(change)?;
        if !wig.events.is_empty() { *slot = stored(&wig); }
        Ok(wig)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Wig>> {
        Ok(self.wigs.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.wigs.write().await.remove(&id).is_some())
    }

    async fn list(&self, query: &WigQuery) -> Result<WigPage> {
        let wigs = self.wigs.read().await;
        let mut hits: Vec<&Wig> = wigs.values().filter(|w| query.matches(w)).collect();
        hits.sort_by(|a, b| query.compare(a, b));
        let total = hits.len() as u64;
        let page: Vec<Wig> = hits
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .cloned()
            .collect();
        let pagination = Pagination::new(query, total, page.len());
        Ok(WigPage { wigs: page, pagination })
    }

    async fn decrement_stock(&self, id: Uuid, quantity: u32) -> Result<Wig> {
        let mut wigs = self.wigs.write().await;
        let wig = wigs.get_mut(&id).ok_or(StoreError::WigNotFound(id))?;
        wig.decrement_stock(quantity)?;
        let events = wig.take_events();
        let mut updated = wig.clone();
        updated.events = events;
        Ok(updated)
    }
}
