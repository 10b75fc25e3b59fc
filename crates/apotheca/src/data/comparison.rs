//! Product comparison list
//!
//! Holds full product snapshots so the comparison view renders without a
//! catalog round-trip.

use crate::config::comparison::CAPACITY;
use crate::config::storage::COMPARISON_KEY;
use crate::data::storage::{self, KeyValueStore};
use crate::data::types::Product;
use tracing::{debug, warn};

/// Ordered, capacity-bounded product snapshots backed by a [`KeyValueStore`]
///
/// Products are unique by id. A full list rejects new products rather than
/// evicting the oldest.
pub struct ComparisonStore<S: KeyValueStore> {
    products: Vec<Product>,
    storage: S,
}

impl<S: KeyValueStore> ComparisonStore<S> {
    /// Hydrate from storage
    ///
    /// Missing or malformed data starts an empty list.
    pub fn initialize(storage: S) -> Self {
        let mut products =
            storage::load_json::<Vec<Product>>(&storage, COMPARISON_KEY).unwrap_or_default();

        // Storage written by hand or by an older build may break the invariants
        let mut seen = std::collections::HashSet::new();
        products.retain(|p| seen.insert(p.id.clone()));
        if products.len() > CAPACITY {
            warn!(
                stored = products.len(),
                capacity = CAPACITY,
                "truncating stored comparison list"
            );
            products.truncate(CAPACITY);
        }

        debug!(count = products.len(), "comparison list loaded");
        Self { products, storage }
    }

    /// Append a product
    ///
    /// Returns `false` without changing anything if the list is full or
    /// already holds a product with the same id.
    pub fn add(&mut self, product: Product) -> bool {
        if self.is_full() {
            debug!(id = %product.id, "comparison list full");
            return false;
        }
        if self.contains(&product.id) {
            return false;
        }

        self.products.push(product);
        self.persist();
        true
    }

    /// Remove the product with `id` (no-op if absent)
    pub fn remove(&mut self, id: &str) {
        self.products.retain(|p| p.id != id);
        self.persist();
    }

    /// Remove every product
    pub fn clear(&mut self) {
        self.products.clear();
        self.persist();
    }

    /// Check if a product is being compared
    pub fn contains(&self, id: &str) -> bool {
        self.products.iter().any(|p| p.id == id)
    }

    /// Products in the order they were added
    pub fn items(&self) -> &[Product] {
        &self.products
    }

    /// Number of products being compared
    pub fn count(&self) -> usize {
        self.products.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Whether another product can still be added
    pub fn is_full(&self) -> bool {
        self.products.len() >= CAPACITY
    }

    /// Maximum number of products
    pub fn capacity(&self) -> usize {
        CAPACITY
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
        if let Err(e) = storage::save_json(&self.storage, COMPARISON_KEY, &self.products) {
            warn!(error = %e, "failed to persist comparison list");
        }
    }
}
