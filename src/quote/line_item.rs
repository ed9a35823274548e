use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::QuoteError;

/// A single priced row of a quotation.
///
/// `amount` always equals `quantity * unit_price`; it is recomputed by the
/// owning ledger and cannot be set directly.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItem {
    pub item_name: String,
    pub model_name: String,
    pub description: String,
    quantity: f64,
    unit_price: f64,
    amount: f64,
}

impl LineItem {
    /// Builds a priced line with its amount already derived.
    pub fn priced(item_name: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        let mut line = Self {
            item_name: item_name.into(),
            quantity: sanitize(quantity),
            unit_price: sanitize(unit_price),
            ..Self::default()
        };
        line.recompute();
        line
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Writes a raw field value. Returns `true` when a numeric input changed.
    pub(crate) fn apply(&mut self, field: LineField, value: &str) -> bool {
        match field {
            LineField::ItemName => self.item_name = value.to_string(),
            LineField::ModelName => self.model_name = value.to_string(),
            LineField::Description => self.description = value.to_string(),
            LineField::Quantity => {
                self.quantity = parse_numeric(value);
                return true;
            }
            LineField::UnitPrice => {
                self.unit_price = parse_numeric(value);
                return true;
            }
        }
        false
    }

    /// Re-derives `amount`. An overflowing product leaves a zero amount.
    pub(crate) fn recompute(&mut self) {
        self.amount = sanitize(self.quantity * self.unit_price);
    }

    /// Whether `quantity * unit_price` is representable.
    pub(crate) fn has_finite_amount(&self) -> bool {
        (self.quantity * self.unit_price).is_finite()
    }
}

/// Editable columns of a line. `amount` is derived and deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineField {
    ItemName,
    ModelName,
    Description,
    Quantity,
    UnitPrice,
}

impl LineField {
    pub const ALL: [LineField; 5] = [
        LineField::ItemName,
        LineField::ModelName,
        LineField::Description,
        LineField::Quantity,
        LineField::UnitPrice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LineField::ItemName => "item_name",
            LineField::ModelName => "model_name",
            LineField::Description => "description",
            LineField::Quantity => "quantity",
            LineField::UnitPrice => "unit_price",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, LineField::Quantity | LineField::UnitPrice)
    }
}

impl fmt::Display for LineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineField {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        LineField::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| match normalized.as_str() {
                "amount" => QuoteError::Validation("amount is derived and cannot be edited".into()),
                other => QuoteError::Validation(format!(
                    "unknown line field `{}` (expected item_name, model_name, description, quantity, unit_price)",
                    other
                )),
            })
    }
}

/// Parses user-entered numbers, treating blank or malformed input as zero.
pub fn parse_numeric(raw: &str) -> f64 {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .map(sanitize)
        .unwrap_or(0.0)
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
