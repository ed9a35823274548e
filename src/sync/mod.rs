//! Header/line synchronization against a [`TableStore`].
//!
//! Creation inserts the header, takes its generated id, then inserts every
//! line tagged with that id. Editing updates the header in place, deletes all
//! of its lines and inserts the current ones. Each step runs only if the
//! previous one succeeded; nothing is rolled back. A failed line insert leaves
//! a header without lines, reported as [`QuoteError::LinesMissing`].

pub mod records;

use std::{cmp::Reverse, sync::Arc};

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::errors::{QuoteError, Result};
use crate::quote::{DraftMode, QuoteDraft, QuoteId, Totals};
use crate::storage::{Filter, TableStore, ID_COLUMN, LINE_ITEMS_TABLE, QUOTES_TABLE};

pub use records::{from_row, to_row, PersistedQuote, StoredLine, StoredQuote};
use records::QUOTE_ID_COLUMN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    Updated,
}

/// Summary of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub quote_id: QuoteId,
    pub outcome: SubmitOutcome,
    pub line_count: usize,
    pub totals: Totals,
}

pub struct QuoteSynchronizer<S: TableStore + ?Sized> {
    store: Arc<S>,
}

impl<S: TableStore + ?Sized> Clone for QuoteSynchronizer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: TableStore + ?Sized> QuoteSynchronizer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Persists the draft according to its mode. The draft itself is never
    /// modified, so a failed attempt can be resubmitted as-is.
    #[instrument(skip(self, draft), fields(mode = ?draft.mode(), lines = draft.lines().len()))]
    pub async fn submit(&self, draft: &QuoteDraft) -> Result<SubmitReceipt> {
        match draft.mode() {
            DraftMode::Create => self.create(draft).await,
            DraftMode::Edit(id) => self.replace(id, draft).await,
        }
    }

    async fn create(&self, draft: &QuoteDraft) -> Result<SubmitReceipt> {
        let header = to_row(&StoredQuote::for_insert(draft))?;
        let created = self.store.insert(QUOTES_TABLE, vec![header]).await?;
        let quote_id = created
            .first()
            .and_then(|row| row.get(ID_COLUMN))
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                QuoteError::Persistence("store did not return an id for the new quote".into())
            })?;
        info!(quote_id, "quote header created");

        self.insert_lines(quote_id, draft).await?;
        Ok(SubmitReceipt {
            quote_id,
            outcome: SubmitOutcome::Created,
            line_count: draft.lines().len(),
            totals: draft.totals(),
        })
    }

    async fn replace(&self, quote_id: QuoteId, draft: &QuoteDraft) -> Result<SubmitReceipt> {
        let patch = to_row(&StoredQuote::for_update(draft))?;
        let affected = self.store.update(QUOTES_TABLE, quote_id, patch).await?;
        if affected == 0 {
            return Err(QuoteError::NotFound(quote_id));
        }
        info!(quote_id, "quote header updated");

        let removed = self
            .store
            .delete(LINE_ITEMS_TABLE, &Filter::eq(QUOTE_ID_COLUMN, quote_id))
            .await?;
        self.insert_lines(quote_id, draft).await?;
        info!(quote_id, removed, inserted = draft.lines().len(), "quote lines replaced");
        Ok(SubmitReceipt {
            quote_id,
            outcome: SubmitOutcome::Updated,
            line_count: draft.lines().len(),
            totals: draft.totals(),
        })
    }

    async fn insert_lines(&self, quote_id: QuoteId, draft: &QuoteDraft) -> Result<()> {
        let rows = draft
            .lines()
            .iter()
            .enumerate()
            .map(|(position, item)| to_row(&StoredLine::from_item(quote_id, position, item)))
            .collect::<Result<Vec<_>>>()?;
        if let Err(err) = self.store.insert(LINE_ITEMS_TABLE, rows).await {
            warn!(quote_id, error = %err, "quote header persisted without line items");
            return Err(QuoteError::LinesMissing {
                quote_id,
                message: err.to_string(),
            });
        }
        Ok(())
    }

    /// Fetches a quote and its lines in position order.
    #[instrument(skip(self))]
    pub async fn load(&self, quote_id: QuoteId) -> Result<PersistedQuote> {
        let header_row = self
            .store
            .select(QUOTES_TABLE, &Filter::eq(ID_COLUMN, quote_id))
            .await?
            .into_iter()
            .next()
            .ok_or(QuoteError::NotFound(quote_id))?;
        let header: StoredQuote = from_row(header_row)?;

        let mut lines = self
            .store
            .select(LINE_ITEMS_TABLE, &Filter::eq(QUOTE_ID_COLUMN, quote_id))
            .await?
            .into_iter()
            .map(from_row::<StoredLine>)
            .collect::<Result<Vec<_>>>()?;
        lines.sort_by_key(|line| (line.position, line.id));
        Ok(PersistedQuote {
            id: quote_id,
            header,
            lines,
        })
    }

    /// Quotes newest first, optionally narrowed by a case-insensitive
    /// substring of the company name.
    #[instrument(skip(self))]
    pub async fn list(&self, company_filter: Option<&str>) -> Result<Vec<StoredQuote>> {
        let needle = company_filter
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty());
        let mut quotes = self
            .store
            .select(QUOTES_TABLE, &Filter::All)
            .await?
            .into_iter()
            .map(from_row::<StoredQuote>)
            .collect::<Result<Vec<_>>>()?;
        if let Some(needle) = needle {
            quotes.retain(|quote| quote.company_name.to_lowercase().contains(&needle));
        }
        quotes.sort_by_key(|quote| Reverse((quote.created_at.clone(), quote.id)));
        Ok(quotes)
    }

    /// Deletes quotes and their lines, lines first. Returns the number of
    /// headers removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, ids: &[QuoteId]) -> Result<u64> {
        if ids.is_empty() {
            return Err(QuoteError::Validation("select at least one quote to delete".into()));
        }
        let lines = self
            .store
            .delete(
                LINE_ITEMS_TABLE,
                &Filter::one_of(QUOTE_ID_COLUMN, ids.iter().copied()),
            )
            .await?;
        let headers = self
            .store
            .delete(QUOTES_TABLE, &Filter::one_of(ID_COLUMN, ids.iter().copied()))
            .await?;
        info!(headers, lines, "quotes deleted");
        Ok(headers)
    }
}
