//! Table store abstraction consumed by the synchronizer and company directory.
//!
//! Rows are loose JSON objects keyed by column name, mirroring the hosted
//! table backends the composer was designed against. Every table owns an
//! integer `id` column generated on insert.

pub mod json_backend;
pub mod memory;
mod tables;

use std::io;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

pub use json_backend::JsonTableStore;
pub use memory::MemoryStore;
pub use tables::Tables;

/// A single table row.
pub type Row = serde_json::Map<String, Value>;

/// Generated row identifier.
pub type RowId = i64;

pub const QUOTES_TABLE: &str = "quotes";
pub const LINE_ITEMS_TABLE: &str = "quote_line_items";
pub const COMPANIES_TABLE: &str = "companies";

pub const ID_COLUMN: &str = "id";
pub const CREATED_AT_COLUMN: &str = "created_at";

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Backend(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Row predicate understood by every backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    All,
    Eq(String, Value),
    In(String, Vec<Value>),
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(column.into(), value.into())
    }

    pub fn one_of<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Filter::In(column.into(), values.into_iter().map(Into::into).collect())
    }

    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq(column, value) => row.get(column) == Some(value),
            Filter::In(column, values) => row
                .get(column)
                .is_some_and(|cell| values.iter().any(|value| value == cell)),
        }
    }
}

/// Reads a nullable column as its type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Request/response contract of the backing table service.
///
/// `insert` returns the created rows including their generated `id`;
/// `update` and `delete` return the number of affected rows.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, table: &str, filter: &Filter) -> StoreResult<Vec<Row>>;
    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>>;
    async fn update(&self, table: &str, id: RowId, patch: Row) -> StoreResult<u64>;
    async fn delete(&self, table: &str, filter: &Filter) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn eq_filter_matches_exact_cell() {
        let filter = Filter::eq("quote_id", 7);
        assert!(filter.matches(&row(json!({"quote_id": 7}))));
        assert!(!filter.matches(&row(json!({"quote_id": 8}))));
        assert!(!filter.matches(&row(json!({"other": 7}))));
    }

    #[test]
    fn in_filter_matches_any_listed_value() {
        let filter = Filter::one_of("id", [1, 3]);
        assert!(filter.matches(&row(json!({"id": 3}))));
        assert!(!filter.matches(&row(json!({"id": 2}))));
        assert!(Filter::All.matches(&row(json!({}))));
    }
}
