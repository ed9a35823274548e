#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use quote_composer::{
    quote::{LineField, QuoteDraft},
    storage::{Filter, MemoryStore, Row, RowId, StoreError, StoreResult, TableStore},
};
use serde_json::Value;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Select,
    Insert,
    Update,
    Delete,
}

/// Memory store that records every call and fails the ones it is told to.
/// Each call yields once so concurrent submissions genuinely interleave.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failures: Mutex<Vec<(Op, String)>>,
    calls: Mutex<Vec<(Op, String)>>,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, op: Op, table: &str) {
        self.failures.lock().unwrap().push((op, table.to_string()));
    }

    pub fn heal(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<(Op, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn touched(&self, op: Op, table: &str) -> bool {
        self.calls()
            .iter()
            .any(|(called, name)| *called == op && name == table)
    }

    async fn enter(&self, op: Op, table: &str) -> StoreResult<()> {
        tokio::task::yield_now().await;
        self.calls.lock().unwrap().push((op, table.to_string()));
        let failing = self
            .failures
            .lock()
            .unwrap()
            .iter()
            .any(|(failing_op, name)| *failing_op == op && name == table);
        if failing {
            return Err(StoreError::Backend(format!(
                "simulated {:?} failure on {}",
                op, table
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TableStore for FlakyStore {
    async fn select(&self, table: &str, filter: &Filter) -> StoreResult<Vec<Row>> {
        self.enter(Op::Select, table).await?;
        self.inner.select(table, filter).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        self.enter(Op::Insert, table).await?;
        self.inner.insert(table, rows).await
    }

    async fn update(&self, table: &str, id: RowId, patch: Row) -> StoreResult<u64> {
        self.enter(Op::Update, table).await?;
        self.inner.update(table, id, patch).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> StoreResult<u64> {
        self.enter(Op::Delete, table).await?;
        self.inner.delete(table, filter).await
    }
}

pub fn row(value: Value) -> Row {
    value.as_object().cloned().expect("object literal")
}

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 15).expect("valid date")
}

/// Draft with one line per `(quantity, unit_price)` pair.
pub fn draft_with_lines(lines: &[(&str, &str)], vat_rate: f64) -> QuoteDraft {
    let mut draft = QuoteDraft::new(date());
    for (index, (quantity, unit_price)) in lines.iter().enumerate() {
        if index > 0 {
            draft.add_line();
        }
        draft
            .set_line_field(index, LineField::ItemName, &format!("item-{}", index + 1))
            .unwrap();
        draft
            .set_line_field(index, LineField::Quantity, quantity)
            .unwrap();
        draft
            .set_line_field(index, LineField::UnitPrice, unit_price)
            .unwrap();
    }
    draft.set_vat_rate(vat_rate).unwrap();
    draft
}
