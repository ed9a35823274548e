//! Quote model: line items, the ledger that derives totals, the header, and
//! the draft that ties them together for one editing session.

pub mod draft;
pub mod header;
pub mod ledger;
pub mod line_item;

pub use draft::{DraftMode, QuoteDraft};
pub use header::{parse_date, HeaderField, QuoteHeader, DATE_FORMAT};
pub use ledger::{LineLedger, Totals};
pub use line_item::{parse_numeric, LineField, LineItem};

/// Generated identifier of a persisted quote header.
pub type QuoteId = i64;
