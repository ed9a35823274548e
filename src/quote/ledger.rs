use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::{QuoteError, Result};

use super::line_item::{LineField, LineItem};

/// Aggregate money figures derived from the ledger.
///
/// Values are kept at full precision; rounding happens only when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub subtotal: f64,
    pub vat_amount: f64,
    pub total_amount: f64,
}

impl Totals {
    pub fn compute(lines: &[LineItem], vat_rate: f64) -> Self {
        let subtotal: f64 = lines.iter().map(LineItem::amount).sum();
        let vat_amount = subtotal * vat_rate / 100.0;
        let totals = Self {
            subtotal,
            vat_amount,
            total_amount: subtotal + vat_amount,
        };
        if totals.is_finite() {
            totals
        } else {
            Self::default()
        }
    }

    pub fn is_finite(&self) -> bool {
        self.subtotal.is_finite() && self.vat_amount.is_finite() && self.total_amount.is_finite()
    }

    fn representable(lines: &[LineItem], vat_rate: f64) -> bool {
        let subtotal: f64 = lines.iter().map(LineItem::amount).sum();
        let vat_amount = subtotal * vat_rate / 100.0;
        (subtotal + vat_amount).is_finite()
    }
}

/// Ordered, never-empty collection of quote lines with eagerly derived totals.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLedger {
    lines: Vec<LineItem>,
    vat_rate: f64,
    totals: Totals,
}

impl Default for LineLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LineLedger {
    /// A ledger holding one blank line and no VAT.
    pub fn new() -> Self {
        Self::from_lines(Vec::new(), 0.0)
    }

    /// Rebuilds a ledger from existing lines; an empty input yields one blank line.
    pub fn from_lines(lines: Vec<LineItem>, vat_rate: f64) -> Self {
        let mut lines = lines;
        if lines.is_empty() {
            lines.push(LineItem::default());
        }
        let mut ledger = Self {
            lines,
            vat_rate: clamp_rate(vat_rate),
            totals: Totals::default(),
        };
        for line in &mut ledger.lines {
            line.recompute();
        }
        ledger.recompute();
        ledger
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Never true once constructed.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Result<&LineItem> {
        self.lines.get(index).ok_or(QuoteError::OutOfRange {
            index,
            len: self.lines.len(),
        })
    }

    pub fn vat_rate(&self) -> f64 {
        self.vat_rate
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn set_field(&mut self, index: usize, field: LineField, value: &str) -> Result<()> {
        let len = self.lines.len();
        let line = self
            .lines
            .get(index)
            .ok_or(QuoteError::OutOfRange { index, len })?;
        let mut edited = line.clone();
        if !edited.apply(field, value) {
            self.lines[index] = edited;
            return Ok(());
        }
        if !edited.has_finite_amount() {
            return Err(too_large(field, value));
        }
        edited.recompute();
        let previous = std::mem::replace(&mut self.lines[index], edited);
        if !Totals::representable(&self.lines, self.vat_rate) {
            self.lines[index] = previous;
            return Err(too_large(field, value));
        }
        self.recompute();
        Ok(())
    }

    pub fn add_line(&mut self) -> usize {
        self.lines.push(LineItem::default());
        self.recompute();
        self.lines.len() - 1
    }

    pub fn push(&mut self, mut line: LineItem) {
        line.recompute();
        self.lines.push(line);
        self.recompute();
    }

    pub fn remove_line(&mut self, index: usize) -> Result<LineItem> {
        if index >= self.lines.len() {
            return Err(QuoteError::OutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        if self.lines.len() == 1 {
            warn!("rejected removal of the last remaining line");
            return Err(QuoteError::Validation(
                "a quote needs at least one line item".into(),
            ));
        }
        let removed = self.lines.remove(index);
        self.recompute();
        Ok(removed)
    }

    /// Sets the VAT percentage. Rates outside 0–100 are rejected unchanged.
    pub fn set_vat_rate(&mut self, rate: f64) -> Result<()> {
        if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
            return Err(QuoteError::Validation(format!(
                "VAT rate must be between 0 and 100 (got {})",
                rate
            )));
        }
        if !Totals::representable(&self.lines, rate) {
            return Err(QuoteError::Validation(format!(
                "VAT rate {} would overflow the quote total",
                rate
            )));
        }
        self.vat_rate = rate;
        self.recompute();
        Ok(())
    }

    fn recompute(&mut self) {
        self.totals = Totals::compute(&self.lines, self.vat_rate);
        debug!(
            lines = self.lines.len(),
            subtotal = self.totals.subtotal,
            total = self.totals.total_amount,
            "ledger recomputed"
        );
    }
}

fn too_large(field: LineField, value: &str) -> QuoteError {
    warn!(field = %field, value, "rejected line edit that overflows the amount");
    QuoteError::Validation(format!(
        "{} `{}` makes the amount too large to represent",
        field,
        value.trim()
    ))
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
