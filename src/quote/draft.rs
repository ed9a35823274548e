use chrono::NaiveDate;
use tracing::debug;

use crate::company::Company;
use crate::currency::VatPolicy;
use crate::errors::{QuoteError, Result};

use super::header::{parse_date, HeaderField, QuoteHeader};
use super::ledger::{LineLedger, Totals};
use super::line_item::{LineField, LineItem};
use super::QuoteId;

/// Whether the draft will create a new quote or replace an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Edit(QuoteId),
}

/// In-memory quote being edited: one header and a never-empty ledger.
///
/// Every mutator ends by mirroring the ledger's VAT rate and totals into the
/// header so the two never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteDraft {
    header: QuoteHeader,
    ledger: LineLedger,
    mode: DraftMode,
}

impl QuoteDraft {
    pub fn new(date: NaiveDate) -> Self {
        Self::from_parts(QuoteHeader::new(date), LineLedger::new(), DraftMode::Create)
    }

    pub fn from_parts(header: QuoteHeader, ledger: LineLedger, mode: DraftMode) -> Self {
        let mut draft = Self {
            header,
            ledger,
            mode,
        };
        draft.refresh();
        draft
    }

    pub fn header(&self) -> &QuoteHeader {
        &self.header
    }

    pub fn ledger(&self) -> &LineLedger {
        &self.ledger
    }

    pub fn lines(&self) -> &[LineItem] {
        self.ledger.lines()
    }

    pub fn totals(&self) -> Totals {
        self.ledger.totals()
    }

    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, DraftMode::Edit(_))
    }

    pub fn set_header_field(&mut self, field: HeaderField, value: &str) -> Result<()> {
        self.ensure_unlocked(field)?;
        match field {
            HeaderField::Date => self.header.date = parse_date(value)?,
            HeaderField::QuotationNumber => self.header.quotation_number = value.trim().to_string(),
            HeaderField::CompanyName => {
                if self.header.company_name != value {
                    self.header.company_reference = None;
                }
                self.header.company_name = value.to_string();
            }
            HeaderField::Currency => self.header.currency = value.trim().to_string(),
            HeaderField::VatRate => {
                let raw = value.trim();
                let rate = if raw.is_empty() {
                    0.0
                } else {
                    raw.parse::<f64>().map_err(|_| {
                        QuoteError::Validation(format!("`{}` is not a valid VAT rate", raw))
                    })?
                };
                self.ledger.set_vat_rate(rate)?;
            }
            HeaderField::Memo => self.header.memo = value.to_string(),
            HeaderField::Remarks => self.header.remarks = value.to_string(),
        }
        self.refresh();
        Ok(())
    }

    pub fn set_line_field(&mut self, index: usize, field: LineField, value: &str) -> Result<()> {
        self.ledger.set_field(index, field, value)?;
        self.refresh();
        Ok(())
    }

    pub fn add_line(&mut self) -> usize {
        let index = self.ledger.add_line();
        self.refresh();
        index
    }

    pub fn remove_line(&mut self, index: usize) -> Result<LineItem> {
        let removed = self.ledger.remove_line(index)?;
        self.refresh();
        Ok(removed)
    }

    pub fn set_vat_rate(&mut self, rate: f64) -> Result<()> {
        self.ledger.set_vat_rate(rate)?;
        self.refresh();
        Ok(())
    }

    /// Copies name, currency and memo from a directory entry and derives the
    /// VAT rate from the company's currency.
    pub fn apply_company(&mut self, company: &Company, policy: &VatPolicy) -> Result<()> {
        self.ensure_unlocked(HeaderField::CompanyName)?;
        self.ledger.set_vat_rate(policy.rate_for(&company.currency))?;
        self.header.company_name = company.name.clone();
        self.header.company_reference = Some(company.id);
        self.header.currency = company.currency.clone();
        self.header.memo = company.memo.clone();
        self.refresh();
        debug!(company = %company.name, vat_rate = self.ledger.vat_rate(), "company applied");
        Ok(())
    }

    fn ensure_unlocked(&self, field: HeaderField) -> Result<()> {
        if self.is_edit() && field.locked_when_editing() {
            return Err(QuoteError::Validation(format!(
                "{} cannot be changed on an existing quote",
                field
            )));
        }
        Ok(())
    }

    fn refresh(&mut self) {
        self.header
            .mirror(self.ledger.vat_rate(), self.ledger.totals());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn header_mirrors_ledger_totals_after_each_mutation() {
        let mut draft = QuoteDraft::new(today());
        draft.set_header_field(HeaderField::VatRate, "10").unwrap();
        draft.set_line_field(0, LineField::Quantity, "2").unwrap();
        draft.set_line_field(0, LineField::UnitPrice, "100").unwrap();
        let second = draft.add_line();
        draft.set_line_field(second, LineField::Quantity, "1").unwrap();
        draft.set_line_field(second, LineField::UnitPrice, "50").unwrap();

        assert_eq!(draft.header().subtotal(), 250.0);
        assert_eq!(draft.header().vat_amount(), 25.0);
        assert_eq!(draft.header().total_amount(), 275.0);
        assert_eq!(draft.header().totals(), draft.totals());

        draft.remove_line(0).unwrap();
        assert_eq!(draft.header().total_amount(), 55.0);
    }

    #[test]
    fn blank_vat_rate_means_zero_and_garbage_is_rejected() {
        let mut draft = QuoteDraft::new(today());
        draft.set_vat_rate(10.0).unwrap();
        draft.set_header_field(HeaderField::VatRate, " ").unwrap();
        assert_eq!(draft.header().vat_rate(), 0.0);
        assert!(draft.set_header_field(HeaderField::VatRate, "ten").is_err());
        assert!(draft.set_header_field(HeaderField::VatRate, "150").is_err());
        assert_eq!(draft.header().vat_rate(), 0.0);
    }

    #[test]
    fn company_selection_sets_currency_memo_and_vat() {
        let policy = VatPolicy::default();
        let mut draft = QuoteDraft::new(today());
        let domestic = Company::new(1, "Hanbit", "KRW").with_memo("net 30");
        draft.apply_company(&domestic, &policy).unwrap();
        assert_eq!(draft.header().company_reference, Some(1));
        assert_eq!(draft.header().currency, "KRW");
        assert_eq!(draft.header().memo, "net 30");
        assert_eq!(draft.header().vat_rate(), 10.0);

        draft
            .apply_company(&Company::new(2, "Globex", "USD"), &policy)
            .unwrap();
        assert_eq!(draft.header().vat_rate(), 0.0);
    }

    #[test]
    fn rejected_company_rate_leaves_header_untouched() {
        let policy = VatPolicy {
            domestic_currency: "KRW".into(),
            domestic_rate: 150.0,
        };
        let mut draft = QuoteDraft::new(today());
        draft.set_header_field(HeaderField::Memo, "keep me").unwrap();
        let before = draft.clone();

        let err = draft
            .apply_company(&Company::new(9, "Acme", "KRW"), &policy)
            .unwrap_err();
        assert!(matches!(err, QuoteError::Validation(_)));
        assert_eq!(draft, before);
        assert_eq!(draft.header().company_reference, None);
    }

    #[test]
    fn typing_a_company_name_drops_the_reference() {
        let mut draft = QuoteDraft::new(today());
        draft
            .apply_company(&Company::new(5, "Acme", "USD"), &VatPolicy::default())
            .unwrap();
        draft
            .set_header_field(HeaderField::CompanyName, "Acme Ltd")
            .unwrap();
        assert_eq!(draft.header().company_reference, None);
    }

    #[test]
    fn edit_mode_locks_identity_fields() {
        let mut draft =
            QuoteDraft::from_parts(QuoteHeader::new(today()), LineLedger::new(), DraftMode::Edit(7));
        for field in [
            HeaderField::Date,
            HeaderField::QuotationNumber,
            HeaderField::CompanyName,
        ] {
            let err = draft.set_header_field(field, "2024-01-01").unwrap_err();
            assert!(matches!(err, QuoteError::Validation(_)));
        }
        assert!(draft
            .apply_company(&Company::new(1, "Acme", "KRW"), &VatPolicy::default())
            .is_err());
        draft.set_header_field(HeaderField::Memo, "updated").unwrap();
        assert_eq!(draft.header().memo, "updated");
    }
}
