//! Table source trait
//!
//! Defines the interface every remote table backend must implement.

use crate::error::{AppError, Result};
use serde_json::Value;

use super::query::Query;

/// A store of JSON rows grouped in named tables
///
/// Rows are returned untyped; callers validate them into record types.
/// Errors are reported as the backend produced them.
pub trait TableSource: Send + Sync {
    /// Machine-readable backend identifier (e.g., "postgrest")
    fn id(&self) -> &'static str;

    /// Rows matching the query, in the query's order
    fn select(&self, query: &Query) -> Result<Vec<Value>>;

    /// Number of rows matching the query's filters
    fn count(&self, query: &Query) -> Result<u64>;

    /// Exactly one matching row
    ///
    /// Zero or several matches are [`AppError::NotFound`].
    fn select_single(&self, query: &Query) -> Result<Value> {
        let mut rows = self.select(query)?;
        if rows.len() == 1 {
            Ok(rows.remove(0))
        } else {
            Err(AppError::NotFound(format!(
                "expected one row from {query}, found {}",
                rows.len()
            )))
        }
    }

    /// Insert `row` into `table` and return the stored row
    ///
    /// Server-managed fields (id, timestamps) are filled in by the backend.
    fn insert(&self, table: &str, row: Value) -> Result<Value>;

    /// Apply `patch` to the rows matching the query's filters
    ///
    /// Returns the updated rows.
    fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>>;
}
