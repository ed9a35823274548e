use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Filter, Row, RowId, CREATED_AT_COLUMN, ID_COLUMN};

/// Plain in-memory table set shared by the memory and JSON backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Table {
    next_id: RowId,
    #[serde(default)]
    rows: Vec<Row>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

impl Tables {
    pub fn select(&self, table: &str, filter: &Filter) -> Vec<Row> {
        self.tables
            .get(table)
            .map(|data| {
                data.rows
                    .iter()
                    .filter(|row| filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Appends rows, assigning ids and creation stamps to rows that lack them.
    pub fn insert(&mut self, table: &str, rows: Vec<Row>) -> Vec<Row> {
        let data = self.tables.entry(table.to_string()).or_default();
        let mut created = Vec::with_capacity(rows.len());
        for mut row in rows {
            let id = match row.get(ID_COLUMN).and_then(Value::as_i64) {
                Some(explicit) => explicit,
                None => data.next_id,
            };
            data.next_id = data.next_id.max(id + 1);
            row.insert(ID_COLUMN.to_string(), Value::from(id));
            row.entry(CREATED_AT_COLUMN.to_string()).or_insert_with(|| {
                Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true))
            });
            data.rows.push(row.clone());
            created.push(row);
        }
        created
    }

    pub fn update(&mut self, table: &str, id: RowId, patch: Row) -> u64 {
        let Some(data) = self.tables.get_mut(table) else {
            return 0;
        };
        let mut affected = 0;
        for row in data
            .rows
            .iter_mut()
            .filter(|row| row.get(ID_COLUMN).and_then(Value::as_i64) == Some(id))
        {
            for (column, value) in patch
                .iter()
                .filter(|(column, _)| column.as_str() != ID_COLUMN)
            {
                row.insert(column.clone(), value.clone());
            }
            affected += 1;
        }
        affected
    }

    pub fn delete(&mut self, table: &str, filter: &Filter) -> u64 {
        let Some(data) = self.tables.get_mut(table) else {
            return 0;
        };
        let before = data.rows.len();
        data.rows.retain(|row| !filter.matches(row));
        (before - data.rows.len()) as u64
    }

    /// Forces the next generated id of `table`.
    pub fn set_next_id(&mut self, table: &str, next_id: RowId) {
        self.tables.entry(table.to_string()).or_default().next_id = next_id;
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |data| data.rows.len())
    }
}
