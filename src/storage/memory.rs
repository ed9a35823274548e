use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Filter, Row, RowId, StoreResult, TableStore, Tables};

/// Process-local table store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts rows directly, bypassing the async contract. Rows keep explicit ids.
    pub async fn seed(&self, table: &str, rows: Vec<Row>) -> Vec<Row> {
        self.tables.lock().await.insert(table, rows)
    }

    pub async fn set_next_id(&self, table: &str, next_id: RowId) {
        self.tables.lock().await.set_next_id(table, next_id);
    }

    pub async fn row_count(&self, table: &str) -> usize {
        self.tables.lock().await.row_count(table)
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn select(&self, table: &str, filter: &Filter) -> StoreResult<Vec<Row>> {
        Ok(self.tables.lock().await.select(table, filter))
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        Ok(self.tables.lock().await.insert(table, rows))
    }

    async fn update(&self, table: &str, id: RowId, patch: Row) -> StoreResult<u64> {
        Ok(self.tables.lock().await.update(table, id, patch))
    }

    async fn delete(&self, table: &str, filter: &Filter) -> StoreResult<u64> {
        Ok(self.tables.lock().await.delete(table, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn round_trips_rows_through_the_trait() {
        let store = MemoryStore::new();
        store.set_next_id("quotes", 42).await;
        let row = json!({"company_name": "Acme"}).as_object().cloned().unwrap();
        let created = store.insert("quotes", vec![row]).await.unwrap();
        assert_eq!(created[0]["id"], json!(42));

        let fetched = store.select("quotes", &Filter::eq("id", 42)).await.unwrap();
        assert_eq!(fetched[0]["company_name"], json!("Acme"));
    }
}
