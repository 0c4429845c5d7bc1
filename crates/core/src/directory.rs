//! In-memory projection of the backend store list.

use chrono::{DateTime, Utc};

use crate::types::{StoreId, StoreRecord};

/// The current list of stores, newest first.
///
/// Replaced wholesale whenever the list is re-fetched. Confirmed mutations can
/// be applied in between so the page reflects them even if a re-fetch fails.
#[derive(Debug, Clone, Default)]
pub struct StoreDirectory {
    stores: Vec<StoreRecord>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl StoreDirectory {
    /// Create an empty directory that has never been loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a freshly fetched list.
    ///
    /// Rows repeating an already seen id are dropped so ids stay unique.
    pub fn replace(&mut self, stores: Vec<StoreRecord>, at: DateTime<Utc>) {
        let mut seen = std::collections::HashSet::with_capacity(stores.len());
        self.stores = stores
            .into_iter()
            .filter(|store| seen.insert(store.id))
            .collect();
        self.refreshed_at = Some(at);
    }

    /// Put a newly created store at the head of the list.
    pub fn prepend(&mut self, store: StoreRecord) {
        self.stores.retain(|existing| existing.id != store.id);
        self.stores.insert(0, store);
    }

    /// Replace the store with the same id in place.
    ///
    /// Returns `false` if no store with that id is present.
    pub fn apply_update(&mut self, store: StoreRecord) -> bool {
        match self.stores.iter_mut().find(|existing| existing.id == store.id) {
            Some(slot) => {
                *slot = store;
                true
            }
            None => false,
        }
    }

    /// Remove a store by id, returning it if present.
    pub fn remove(&mut self, id: StoreId) -> Option<StoreRecord> {
        let index = self.stores.iter().position(|store| store.id == id)?;
        Some(self.stores.remove(index))
    }

    /// Look up a store by id.
    #[must_use]
    pub fn get(&self, id: StoreId) -> Option<&StoreRecord> {
        self.stores.iter().find(|store| store.id == id)
    }

    /// All stores, newest first.
    #[must_use]
    pub fn stores(&self) -> &[StoreRecord] {
        &self.stores
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// When the list was last replaced from the backend.
    #[must_use]
    pub const fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}
