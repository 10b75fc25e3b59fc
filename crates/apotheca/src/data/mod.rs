//! Client-side persistence
//!
//! Handles the wishlist, the comparison list and their durable storage.

pub mod comparison;
pub mod storage;
pub mod types;
pub mod wishlist;

// Re-export common types
pub use comparison::ComparisonStore;
pub use storage::{load_json, save_json, FileStorage, KeyValueStore, MemoryStorage};
pub use types::Product;
pub use wishlist::WishlistStore;
