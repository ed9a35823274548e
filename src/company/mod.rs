//! Read-only view of the company directory that pre-fills quote headers.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{QuoteError, Result};
use crate::storage::{null_as_default, Filter, Row, TableStore, COMPANIES_TABLE};

/// Company record as stored by the external company registry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shipping_method: String,
}

impl Company {
    pub fn new(id: i64, name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            currency: currency.into(),
            ..Self::default()
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    pub fn from_row(row: Row) -> Result<Self> {
        serde_json::from_value(Value::Object(row))
            .map_err(|err| QuoteError::Persistence(format!("malformed company row: {}", err)))
    }
}

/// Source of known companies.
#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn companies(&self) -> Result<Vec<Company>>;

    /// Case-insensitive substring search over company names.
    async fn search(&self, term: &str) -> Result<Vec<Company>> {
        let needle = term.trim().to_lowercase();
        let companies = self.companies().await?;
        Ok(companies
            .into_iter()
            .filter(|company| company.name.to_lowercase().contains(&needle))
            .collect())
    }
}

/// Directory backed by the `companies` table of a [`TableStore`].
pub struct StoreDirectory<S: TableStore + ?Sized> {
    store: Arc<S>,
}

impl<S: TableStore + ?Sized> StoreDirectory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: TableStore + ?Sized> CompanyDirectory for StoreDirectory<S> {
    async fn companies(&self) -> Result<Vec<Company>> {
        let rows = self.store.select(COMPANIES_TABLE, &Filter::All).await?;
        rows.into_iter().map(Company::from_row).collect()
    }
}
