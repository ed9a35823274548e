use std::result::Result as StdResult;

use thiserror::Error;

use crate::quote::QuoteId;
use crate::storage::StoreError;

/// Unified error type for ledger, draft, typeahead, and synchronization failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuoteError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Line {index} is out of range (ledger has {len} lines)")]
    OutOfRange { index: usize, len: usize },
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Persistence error: {message} (quote {quote_id} has no line items)")]
    LinesMissing { quote_id: QuoteId, message: String },
    #[error("Quote {0} not found")]
    NotFound(QuoteId),
    #[error("A submission is already in progress")]
    SubmissionInFlight,
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, QuoteError>;

impl QuoteError {
    /// Errors the operator can fix in place without losing the draft.
    pub fn is_user_notice(&self) -> bool {
        matches!(
            self,
            QuoteError::Validation(_) | QuoteError::OutOfRange { .. }
        )
    }
}

impl From<StoreError> for QuoteError {
    fn from(err: StoreError) -> Self {
        QuoteError::Persistence(err.to_string())
    }
}

impl From<std::io::Error> for QuoteError {
    fn from(err: std::io::Error) -> Self {
        QuoteError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for QuoteError {
    fn from(err: serde_json::Error) -> Self {
        QuoteError::Config(err.to_string())
    }
}
