//! Remote tabular data sources
//!
//! A [`TableSource`] runs [`Query`] values against a table store. The
//! hosted backend is reached through [`PostgrestSource`]; [`MemorySource`]
//! keeps tables in memory.

pub mod memory;
pub mod postgrest;
pub mod query;
pub mod traits;

// Re-exports
pub use memory::MemorySource;
pub use postgrest::PostgrestSource;
pub use query::{Direction, Filter, FilterOp, Order, Query};
pub use traits::TableSource;
