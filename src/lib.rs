#![doc(test(attr(deny(warnings))))]

//! Quote Composer composes multi-line price quotations: a line-item ledger with
//! eagerly derived totals, a reusable typeahead engine for free-text fields, and
//! the header/line synchronization protocol that persists drafts to a table store.

pub mod cli;
pub mod company;
pub mod config;
pub mod currency;
pub mod errors;
pub mod quote;
pub mod session;
pub mod storage;
pub mod sync;
pub mod typeahead;
pub mod utils;

pub use errors::{QuoteError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Quote composer tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
