//! In-memory table source
//!
//! Tables kept in process memory, with the same server-managed fields the
//! hosted backend fills in (`id`, `created_at`, `updated_at`). Used to
//! exercise the services without a network.

use crate::error::{AppError, Result};

use super::query::{Direction, Filter, FilterOp, Query};
use super::traits::TableSource;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Tables of JSON rows held in memory
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemorySource {
    /// Create a source with no tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Store rows verbatim, without filling server-managed fields
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        self.lock()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    /// All rows of a table in insertion order
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().get(table).cloned().unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Value>>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn matching(&self, query: &Query) -> Vec<Value> {
        let tables = self.lock();
        let mut rows: Vec<Value> = tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(f, row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(&order.column), b.get(&order.column));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }
        rows
    }
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Text form of a cell, as the REST filter syntax sees it
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Compare two cell texts as timestamps, then numbers, then strings
fn compare_text(a: &str, b: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (
        DateTime::parse_from_rfc3339(a),
        DateTime::parse_from_rfc3339(b),
    ) {
        return a.cmp(&b);
    }
    if let (Ok(a), Ok(b)) = (a.parse::<f64>(), b.parse::<f64>()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    a.cmp(b)
}

/// Ascending order with nulls last
///
/// Descending order reverses this, so nulls come first there.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(cell_text), b.and_then(cell_text)) {
        (Some(a), Some(b)) => compare_text(&a, &b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn matches(filter: &Filter, row: &Value) -> bool {
    let Some(cell) = row.get(&filter.column).and_then(cell_text) else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => cell == filter.value,
        FilterOp::Gte => compare_text(&cell, &filter.value) != Ordering::Less,
    }
}

fn as_object(table: &str, row: Value) -> Result<Map<String, Value>> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(AppError::InvalidRow {
            table: table.to_string(),
            reason: format!("expected an object, got {other}"),
        }),
    }
}

impl TableSource for MemorySource {
    fn id(&self) -> &'static str {
        "memory"
    }

    fn select(&self, query: &Query) -> Result<Vec<Value>> {
        Ok(self.matching(query))
    }

    fn count(&self, query: &Query) -> Result<u64> {
        Ok(self.matching(query).len() as u64)
    }

    fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let mut map = as_object(table, row)?;
        let now = now_timestamp();
        map.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        map.entry("created_at")
            .or_insert_with(|| Value::String(now.clone()));
        map.insert("updated_at".to_string(), Value::String(now));

        let stored = Value::Object(map);
        self.lock()
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>> {
        let patch = as_object(&query.table, patch)?;
        let now = now_timestamp();

        let mut tables = self.lock();
        let Some(rows) = tables.get_mut(&query.table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in rows
            .iter_mut()
            .filter(|row| query.filters.iter().all(|f| matches(f, row)))
        {
            if let Value::Object(map) = row {
                for (key, value) in &patch {
                    map.insert(key.clone(), value.clone());
                }
                map.insert("updated_at".to_string(), Value::String(now.clone()));
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> MemorySource {
        let source = MemorySource::new();
        source.seed(
            "cms_pages",
            vec![
                json!({"id": "1", "slug": "about", "status": "published", "updated_at": "2026-10-01T10:00:00Z"}),
                json!({"id": "2", "slug": "faq", "status": "draft", "updated_at": "2026-10-03T10:00:00Z"}),
                json!({"id": "3", "slug": "terms", "status": "published", "updated_at": "2026-10-02T10:00:00+00:00"}),
            ],
        );
        source
    }

    fn ids(rows: &[Value]) -> Vec<&str> {
        rows.iter().map(|r| r["id"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_select_filters() {
        let rows = source()
            .select(&Query::table("cms_pages").eq("status", "published"))
            .unwrap();
        assert_eq!(ids(&rows), vec!["1", "3"]);
    }

    #[test]
    fn test_select_orders_mixed_timestamp_formats() {
        let rows = source()
            .select(&Query::table("cms_pages").order_by("updated_at", Direction::Descending))
            .unwrap();
        assert_eq!(ids(&rows), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_gte_on_timestamps() {
        let count = source()
            .count(&Query::table("cms_pages").gte("updated_at", "2026-10-02T00:00:00.000Z"))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_unknown_table_is_empty() {
        assert!(source().select(&Query::table("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_select_single_default() {
        let source = source();
        let row = source
            .select_single(&Query::table("cms_pages").eq("slug", "about"))
            .unwrap();
        assert_eq!(row["id"], "1");

        let none = source.select_single(&Query::table("cms_pages").eq("slug", "missing"));
        assert!(matches!(none, Err(AppError::NotFound(_))));

        let many = source.select_single(&Query::table("cms_pages").eq("status", "published"));
        assert!(matches!(many, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_insert_fills_server_fields() {
        let source = MemorySource::new();
        let row = source
            .insert("blog_posts", json!({"slug": "new", "title": "New"}))
            .unwrap();

        assert!(Uuid::parse_str(row["id"].as_str().unwrap()).is_ok());
        assert!(row["created_at"].is_string());
        assert!(row["updated_at"].is_string());
        assert_eq!(source.rows("blog_posts").len(), 1);
    }

    #[test]
    fn test_insert_rejects_non_object() {
        let result = MemorySource::new().insert("blog_posts", json!([1, 2]));
        assert!(matches!(result, Err(AppError::InvalidRow { .. })));
    }

    #[test]
    fn test_update_patches_matching_rows() {
        let source = source();
        let updated = source
            .update(
                &Query::table("cms_pages").eq("slug", "faq"),
                json!({"status": "published"}),
            )
            .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0]["status"], "published");
        assert_eq!(
            source
                .count(&Query::table("cms_pages").eq("status", "published"))
                .unwrap(),
            3
        );
    }

    #[test]
    fn test_null_ordering_follows_direction() {
        let source = MemorySource::new();
        source.seed(
            "blog_posts",
            vec![
                json!({"id": "draft", "published_at": null}),
                json!({"id": "old", "published_at": "2026-10-01T00:00:00Z"}),
                json!({"id": "new", "published_at": "2026-10-05T00:00:00Z"}),
            ],
        );

        let asc = source
            .select(&Query::table("blog_posts").order_by("published_at", Direction::Ascending))
            .unwrap();
        assert_eq!(ids(&asc), vec!["old", "new", "draft"]);

        let desc = source
            .select(&Query::table("blog_posts").order_by("published_at", Direction::Descending))
            .unwrap();
        assert_eq!(ids(&desc), vec!["draft", "new", "old"]);
    }
}
