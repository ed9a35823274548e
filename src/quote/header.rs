use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::QuoteError;

use super::ledger::Totals;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Descriptive quote fields plus a denormalized copy of the ledger totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteHeader {
    pub date: NaiveDate,
    pub quotation_number: String,
    pub company_name: String,
    pub company_reference: Option<i64>,
    pub currency: String,
    pub memo: String,
    pub remarks: String,
    vat_rate: f64,
    subtotal: f64,
    vat_amount: f64,
    total_amount: f64,
}

impl QuoteHeader {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            quotation_number: String::new(),
            company_name: String::new(),
            company_reference: None,
            currency: String::new(),
            memo: String::new(),
            remarks: String::new(),
            vat_rate: 0.0,
            subtotal: 0.0,
            vat_amount: 0.0,
            total_amount: 0.0,
        }
    }

    pub fn vat_rate(&self) -> f64 {
        self.vat_rate
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn vat_amount(&self) -> f64 {
        self.vat_amount
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            vat_amount: self.vat_amount,
            total_amount: self.total_amount,
        }
    }

    pub(crate) fn mirror(&mut self, vat_rate: f64, totals: Totals) {
        self.vat_rate = vat_rate;
        self.subtotal = totals.subtotal;
        self.vat_amount = totals.vat_amount;
        self.total_amount = totals.total_amount;
    }
}

/// Header fields an operator can type into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    Date,
    QuotationNumber,
    CompanyName,
    Currency,
    VatRate,
    Memo,
    Remarks,
}

impl HeaderField {
    pub const ALL: [HeaderField; 7] = [
        HeaderField::Date,
        HeaderField::QuotationNumber,
        HeaderField::CompanyName,
        HeaderField::Currency,
        HeaderField::VatRate,
        HeaderField::Memo,
        HeaderField::Remarks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderField::Date => "date",
            HeaderField::QuotationNumber => "quotation_number",
            HeaderField::CompanyName => "company_name",
            HeaderField::Currency => "currency",
            HeaderField::VatRate => "vat_rate",
            HeaderField::Memo => "memo",
            HeaderField::Remarks => "remarks",
        }
    }

    /// Fields frozen once a quote has been persisted.
    pub fn locked_when_editing(&self) -> bool {
        matches!(
            self,
            HeaderField::Date | HeaderField::QuotationNumber | HeaderField::CompanyName
        )
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderField {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let normalized = match normalized.as_str() {
            "company" => "company_name".to_string(),
            "vat" => "vat_rate".to_string(),
            "number" => "quotation_number".to_string(),
            _ => normalized,
        };
        HeaderField::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| {
                if matches!(
                    normalized.as_str(),
                    "subtotal" | "vat_amount" | "total_amount"
                ) {
                    QuoteError::Validation(format!("{} is derived and cannot be edited", normalized))
                } else {
                    QuoteError::Validation(format!("unknown header field `{}`", normalized))
                }
            })
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, QuoteError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| QuoteError::Validation("Use YYYY-MM-DD format for dates".into()))
}
