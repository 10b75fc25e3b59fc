//! Wishlist management
//!
//! A set of product ids mirrored to durable storage after every change.

use crate::config::storage::WISHLIST_KEY;
use crate::data::storage::{self, KeyValueStore};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Wishlisted product ids backed by a [`KeyValueStore`]
///
/// Ids are unique and unordered. The whole set is re-serialized on every
/// mutation; a failed write is logged and the in-memory set stays
/// authoritative.
pub struct WishlistStore<S: KeyValueStore> {
    ids: HashSet<String>,
    storage: S,
}

impl<S: KeyValueStore> WishlistStore<S> {
    /// Hydrate from storage
    ///
    /// Missing or malformed data starts an empty wishlist.
    pub fn initialize(storage: S) -> Self {
        let ids: HashSet<String> =
            storage::load_json::<Vec<String>>(&storage, WISHLIST_KEY)
                .map(|ids| ids.into_iter().collect())
                .unwrap_or_default();
        debug!(count = ids.len(), "wishlist loaded");
        Self { ids, storage }
    }

    /// Add a product id (no-op if already present)
    pub fn add(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
        self.persist();
    }

    /// Remove a product id (no-op if absent)
    pub fn remove(&mut self, id: &str) {
        self.ids.remove(id);
        self.persist();
    }

    /// Flip membership of `id`
    ///
    /// Returns whether the id is wishlisted afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        let present = if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        };
        self.persist();
        present
    }

    /// Remove every id
    pub fn clear(&mut self) {
        self.ids.clear();
        self.persist();
    }

    /// Check if a product is wishlisted
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Snapshot of the current ids, in no particular order
    pub fn list(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }

    /// Number of wishlisted products
    pub fn count(&self) -> usize {
        self.ids.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The storage collaborator
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Release the storage collaborator
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&self) {
        let ids: Vec<&String> = self.ids.iter().collect();
        if let Err(e) = storage::save_json(&self.storage, WISHLIST_KEY, &ids) {
            warn!(error = %e, "failed to persist wishlist");
        }
    }
}
