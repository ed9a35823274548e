//! Row shapes of the `quotes` and `quote_line_items` tables.

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{QuoteError, Result};
use crate::quote::{
    DraftMode, LineItem, LineLedger, QuoteDraft, QuoteHeader, QuoteId, Totals,
};
use crate::storage::{null_as_default, Row};

pub const QUOTE_ID_COLUMN: &str = "quote_id";

/// Header row. `subtotal`, `vat_amount` and `total_amount` are a cache of
/// the ledger at submit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuoteId>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotation_number: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_name: String,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vat_rate: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub memo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remarks: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtotal: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vat_amount: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl StoredQuote {
    /// Payload written when the quote is first created.
    pub fn for_insert(draft: &QuoteDraft) -> Self {
        let header = draft.header();
        let totals = draft.totals();
        Self {
            id: None,
            date: header.date,
            quotation_number: Some(header.quotation_number.clone()),
            company_name: header.company_name.clone(),
            company_id: header.company_reference,
            currency: header.currency.clone(),
            vat_rate: draft.ledger().vat_rate(),
            memo: header.memo.clone(),
            remarks: header.remarks.clone(),
            subtotal: totals.subtotal,
            vat_amount: totals.vat_amount,
            total_amount: totals.total_amount,
            created_at: None,
        }
    }

    /// Patch applied on edit. The quotation number is never rewritten.
    pub fn for_update(draft: &QuoteDraft) -> Self {
        Self {
            quotation_number: None,
            ..Self::for_insert(draft)
        }
    }

    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            vat_amount: self.vat_amount,
            total_amount: self.total_amount,
        }
    }
}

/// Child line row, tagged with its parent quote and its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub quote_id: QuoteId,
    #[serde(default)]
    pub position: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount: f64,
}

impl StoredLine {
    pub fn from_item(quote_id: QuoteId, position: usize, item: &LineItem) -> Self {
        Self {
            id: None,
            quote_id,
            position,
            item_name: item.item_name.clone(),
            model_name: item.model_name.clone(),
            description: item.description.clone(),
            quantity: item.quantity(),
            unit_price: item.unit_price(),
            amount: item.amount(),
        }
    }

    /// Rebuilds the editable line; the stored amount is re-derived.
    pub fn to_item(&self) -> LineItem {
        let mut item = LineItem::priced(self.item_name.clone(), self.quantity, self.unit_price);
        item.model_name = self.model_name.clone();
        item.description = self.description.clone();
        item
    }
}

/// A header with its lines in position order.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedQuote {
    pub id: QuoteId,
    pub header: StoredQuote,
    pub lines: Vec<StoredLine>,
}

impl PersistedQuote {
    /// Opens the quote for editing. A quote without lines gets one blank line.
    pub fn into_draft(self) -> QuoteDraft {
        let mut header = QuoteHeader::new(self.header.date);
        header.quotation_number = self.header.quotation_number.unwrap_or_default();
        header.company_name = self.header.company_name;
        header.company_reference = self.header.company_id;
        header.currency = self.header.currency;
        header.memo = self.header.memo;
        header.remarks = self.header.remarks;
        let items = self.lines.iter().map(StoredLine::to_item).collect();
        let ledger = LineLedger::from_lines(items, self.header.vat_rate);
        QuoteDraft::from_parts(header, ledger, DraftMode::Edit(self.id))
    }
}

pub fn to_row<T: Serialize>(record: &T) -> Result<Row> {
    match serde_json::to_value(record) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(other) => Err(QuoteError::Persistence(format!(
            "expected a row object, got {}",
            other
        ))),
        Err(err) => Err(QuoteError::Persistence(err.to_string())),
    }
}

pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T> {
    serde_json::from_value(Value::Object(row))
        .map_err(|err| QuoteError::Persistence(format!("malformed row: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::LineField;
    use serde_json::json;

    fn draft() -> QuoteDraft {
        let mut draft = QuoteDraft::new(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        draft.set_vat_rate(10.0).unwrap();
        draft.set_line_field(0, LineField::Quantity, "2").unwrap();
        draft.set_line_field(0, LineField::UnitPrice, "100").unwrap();
        draft
    }

    #[test]
    fn update_patch_omits_quotation_number() {
        let row = to_row(&StoredQuote::for_update(&draft())).unwrap();
        assert!(!row.contains_key("quotation_number"));
        assert!(!row.contains_key("id"));
        assert_eq!(row["date"], json!("2024-05-02"));
        assert_eq!(row["total_amount"], json!(220.0));

        let insert = to_row(&StoredQuote::for_insert(&draft())).unwrap();
        assert_eq!(insert["quotation_number"], json!(""));
    }

    #[test]
    fn rows_with_nulls_still_load() {
        let row = json!({
            "id": 9,
            "date": "2024-01-01",
            "company_name": null,
            "vat_rate": null,
            "created_at": "2024-01-01T00:00:00Z"
        });
        let stored: StoredQuote = from_row(row.as_object().cloned().unwrap()).unwrap();
        assert_eq!(stored.id, Some(9));
        assert_eq!(stored.company_name, "");
        assert_eq!(stored.vat_rate, 0.0);
    }

    #[test]
    fn empty_persisted_quote_opens_with_one_line() {
        let header = StoredQuote {
            id: Some(3),
            ..StoredQuote::for_insert(&draft())
        };
        let draft = PersistedQuote {
            id: 3,
            header,
            lines: Vec::new(),
        }
        .into_draft();
        assert_eq!(draft.mode(), DraftMode::Edit(3));
        assert_eq!(draft.lines().len(), 1);
        assert_eq!(draft.totals(), Totals::default());
        assert_eq!(draft.header().vat_rate(), 10.0);
    }
}
