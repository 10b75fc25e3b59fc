//! Apotheca — storefront client state
//!
//! Wishlist and product comparison stores, persisted through an injected
//! key-value storage collaborator.
//!
//! ## Quick start
//!
//! ```
//! use apotheca::data::{MemoryStorage, WishlistStore};
//!
//! let mut wishlist = WishlistStore::initialize(MemoryStorage::new());
//! wishlist.add("sku-1");
//! assert!(wishlist.contains("sku-1"));
//! ```

pub mod config;
pub mod data;
pub mod error;

pub use error::{Error, Result};
