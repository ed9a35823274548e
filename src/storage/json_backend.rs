use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::utils::persistence::{read_if_present, replace_atomic};

use super::{Filter, Row, RowId, StoreResult, TableStore, Tables};

/// File-backed table store. Every mutation rewrites the whole document
/// atomically; memory is only updated once the write has landed.
#[derive(Debug)]
pub struct JsonTableStore {
    path: PathBuf,
    tables: Mutex<Tables>,
}

impl JsonTableStore {
    /// Opens the store at `path`, starting empty when the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let tables = match read_if_present(&path)? {
            Some(data) => serde_json::from_str(&data)?,
            None => Tables::default(),
        };
        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, tables: &Tables) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(tables)?;
        replace_atomic(&self.path, &json)?;
        debug!(path = %self.path.display(), "table store persisted");
        Ok(())
    }
}

#[async_trait]
impl TableStore for JsonTableStore {
    async fn select(&self, table: &str, filter: &Filter) -> StoreResult<Vec<Row>> {
        Ok(self.tables.lock().await.select(table, filter))
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> StoreResult<Vec<Row>> {
        let mut tables = self.tables.lock().await;
        let mut staged = tables.clone();
        let created = staged.insert(table, rows);
        self.persist(&staged)?;
        *tables = staged;
        Ok(created)
    }

    async fn update(&self, table: &str, id: RowId, patch: Row) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let mut staged = tables.clone();
        let affected = staged.update(table, id, patch);
        if affected > 0 {
            self.persist(&staged)?;
            *tables = staged;
        }
        Ok(affected)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let mut staged = tables.clone();
        let removed = staged.delete(table, filter);
        if removed > 0 {
            self.persist(&staged)?;
            *tables = staged;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::persistence::tmp_path;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reopening_restores_rows_and_id_sequence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tables.json");
        {
            let store = JsonTableStore::open(&path).unwrap();
            let row = json!({"name": "Acme"}).as_object().cloned().unwrap();
            store.insert("companies", vec![row]).await.unwrap();
        }
        let store = JsonTableStore::open(&path).unwrap();
        let row = json!({"name": "Globex"}).as_object().cloned().unwrap();
        let created = store.insert("companies", vec![row]).await.unwrap();
        assert_eq!(created[0]["id"], json!(2));
        assert_eq!(store.select("companies", &Filter::All).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_write_keeps_memory_and_disk_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tables.json");
        let store = JsonTableStore::open(&path).unwrap();
        let row = json!({"name": "Acme"}).as_object().cloned().unwrap();
        store.insert("companies", vec![row.clone()]).await.unwrap();
        let original = fs::read_to_string(&path).unwrap();

        // A directory squatting on the temp path makes File::create fail.
        fs::create_dir_all(tmp_path(&path)).unwrap();
        assert!(store.insert("companies", vec![row]).await.is_err());

        assert_eq!(fs::read_to_string(&path).unwrap(), original);
        let rows = store.select("companies", &Filter::All).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
