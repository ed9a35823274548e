//! One editing session of the quote form: the draft, the shared typeahead
//! engine for its suggestion fields, the known companies and the submit gate.

mod gate;

pub use gate::{SubmitGate, SubmitTicket};

use std::time::Instant;

use tracing::info;

use crate::company::{Company, CompanyDirectory};
use crate::config::Config;
use crate::currency::VatPolicy;
use crate::errors::{QuoteError, Result};
use crate::quote::{HeaderField, QuoteDraft};
use crate::storage::TableStore;
use crate::sync::{QuoteSynchronizer, SubmitReceipt};
use crate::typeahead::{CandidateList, CandidateRegistry, FieldId, Key, KeyOutcome, TypeaheadEngine};

/// Fields of the quote form that offer suggestions.
pub const QUOTE_FORM_FIELDS: [FieldId; 2] = [FieldId::Currency, FieldId::CompanyName];

pub struct QuoteSession {
    draft: QuoteDraft,
    typeahead: TypeaheadEngine,
    candidates: CandidateRegistry,
    companies: Vec<Company>,
    vat_policy: VatPolicy,
    gate: SubmitGate,
}

impl QuoteSession {
    pub fn new(draft: QuoteDraft, config: &Config) -> Self {
        Self {
            draft,
            typeahead: TypeaheadEngine::new(config.blur_grace()),
            candidates: CandidateRegistry::with_defaults(config),
            companies: Vec::new(),
            vat_policy: config.vat_policy(),
            gate: SubmitGate::new(),
        }
    }

    pub fn draft(&self) -> &QuoteDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut QuoteDraft {
        &mut self.draft
    }

    pub fn typeahead(&self) -> &TypeaheadEngine {
        &self.typeahead
    }

    pub fn candidates(&self) -> &CandidateRegistry {
        &self.candidates
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn vat_policy(&self) -> &VatPolicy {
        &self.vat_policy
    }

    /// Refreshes the company list and the company-name suggestions.
    pub async fn load_companies<D>(&mut self, directory: &D) -> Result<usize>
    where
        D: CompanyDirectory + ?Sized,
    {
        let companies = directory.companies().await?;
        self.candidates
            .set(FieldId::CompanyName, CandidateList::from_companies(&companies));
        self.companies = companies;
        Ok(self.companies.len())
    }

    /// Applies a known company to the draft header.
    pub fn select_company(&mut self, id: i64) -> Result<&Company> {
        let index = self
            .companies
            .iter()
            .position(|company| company.id == id)
            .ok_or_else(|| QuoteError::Validation(format!("no company with id {}", id)))?;
        self.draft
            .apply_company(&self.companies[index], &self.vat_policy)?;
        Ok(&self.companies[index])
    }

    /// Current text of a suggestion field.
    pub fn field_text(&self, field: FieldId) -> Result<&str> {
        let header = self.draft.header();
        match field {
            FieldId::Currency => Ok(&header.currency),
            FieldId::CompanyName => Ok(&header.company_name),
            other => Err(not_on_form(other)),
        }
    }

    /// Text typed into a suggestion field.
    pub fn input(&mut self, field: FieldId, text: &str) -> Result<()> {
        self.draft.set_header_field(header_field(field)?, text)?;
        self.typeahead
            .input(field, text, self.candidates.list(field));
        Ok(())
    }

    pub fn focus(&mut self, field: FieldId) -> Result<()> {
        let text = self.field_text(field)?.to_string();
        self.typeahead
            .focus(field, &text, self.candidates.list(field));
        Ok(())
    }

    pub fn key(&mut self, field: FieldId, key: Key) -> Result<KeyOutcome> {
        header_field(field)?;
        let outcome = self.typeahead.key(field, key);
        if let KeyOutcome::Selected(value) = &outcome {
            self.commit(field, value)?;
        }
        Ok(outcome)
    }

    pub fn hover(&mut self, field: FieldId, index: usize) -> bool {
        self.typeahead.hover(field, index)
    }

    pub fn click(&mut self, field: FieldId, index: usize, now: Instant) -> Result<Option<String>> {
        header_field(field)?;
        let selected = self.typeahead.click(field, index, now);
        if let Some(value) = &selected {
            self.commit(field, value)?;
        }
        Ok(selected)
    }

    pub fn blur(&mut self, field: FieldId, now: Instant) {
        self.typeahead.blur(field, now);
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.typeahead.tick(now)
    }

    fn commit(&mut self, field: FieldId, value: &str) -> Result<()> {
        if field == FieldId::CompanyName {
            if let Some(company) = self.companies.iter().find(|company| company.name == value) {
                return self.draft.apply_company(company, &self.vat_policy);
            }
        }
        self.draft.set_header_field(header_field(field)?, value)
    }

    /// Submits the draft. A second call while one is outstanding fails with
    /// [`QuoteError::SubmissionInFlight`] and issues no store calls.
    pub async fn submit<S>(&self, sync: &QuoteSynchronizer<S>) -> Result<SubmitReceipt>
    where
        S: TableStore + ?Sized,
    {
        let _ticket = self.gate.try_acquire()?;
        sync.submit(&self.draft).await
    }

    pub fn is_submitting(&self) -> bool {
        self.gate.is_busy()
    }

    /// Discards the draft without persisting anything.
    pub fn cancel(self) {
        info!(mode = ?self.draft.mode(), "quote draft discarded");
    }
}

fn header_field(field: FieldId) -> Result<HeaderField> {
    match field {
        FieldId::Currency => Ok(HeaderField::Currency),
        FieldId::CompanyName => Ok(HeaderField::CompanyName),
        other => Err(not_on_form(other)),
    }
}

fn not_on_form(field: FieldId) -> QuoteError {
    QuoteError::Validation(format!("{} is not a field of the quote form", field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn session() -> QuoteSession {
        let draft = QuoteDraft::new(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        QuoteSession::new(draft, &Config::default())
    }

    #[test]
    fn typing_currency_writes_draft_and_suggests() {
        let mut session = session();
        session.input(FieldId::Currency, "e").unwrap();
        assert_eq!(session.draft().header().currency, "e");
        assert_eq!(session.typeahead().suggestions()[0], "EUR");

        session.key(FieldId::Currency, Key::Down).unwrap();
        let outcome = session.key(FieldId::Currency, Key::Enter).unwrap();
        assert_eq!(outcome, KeyOutcome::Selected("EUR".into()));
        assert_eq!(session.draft().header().currency, "EUR");
    }

    #[test]
    fn picking_a_company_name_applies_the_company() {
        let mut session = session();
        session.companies = vec![Company::new(4, "Hanbit Tech", "KRW").with_memo("VIP")];
        session.candidates.set(
            FieldId::CompanyName,
            CandidateList::from_companies(&session.companies),
        );
        session.input(FieldId::CompanyName, "han").unwrap();
        let picked = session
            .click(FieldId::CompanyName, 0, Instant::now())
            .unwrap();
        assert_eq!(picked.as_deref(), Some("Hanbit Tech"));
        let header = session.draft().header();
        assert_eq!(header.company_reference, Some(4));
        assert_eq!(header.memo, "VIP");
        assert_eq!(header.vat_rate(), 10.0);
    }

    #[test]
    fn company_fields_are_not_on_the_quote_form() {
        let mut session = session();
        assert!(session.input(FieldId::Country, "Ko").is_err());
        assert!(session.select_company(99).is_err());
    }
}
