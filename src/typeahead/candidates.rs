use std::collections::HashMap;

use crate::company::Company;
use crate::config::Config;

use super::catalog::{COUNTRIES, CURRENCIES, SHIPPING_METHODS};
use super::field::FieldId;

/// Ordered source of known values for one field.
pub trait CandidateProvider {
    fn candidates(&self) -> &[String];
}

/// Ordered candidate list with duplicates removed (first occurrence wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList {
    values: Vec<String>,
}

impl CandidateList {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Vec::new();
        for value in values.into_iter().map(Into::into) {
            if !value.trim().is_empty() && !list.contains(&value) {
                list.push(value);
            }
        }
        Self { values: list }
    }

    pub fn from_companies(companies: &[Company]) -> Self {
        Self::new(companies.iter().map(|company| company.name.clone()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl CandidateProvider for CandidateList {
    fn candidates(&self) -> &[String] {
        &self.values
    }
}

impl CandidateProvider for [String] {
    fn candidates(&self) -> &[String] {
        self
    }
}

/// Candidate lists for every typeahead field.
#[derive(Debug, Clone, Default)]
pub struct CandidateRegistry {
    lists: HashMap<FieldId, CandidateList>,
}

impl CandidateRegistry {
    /// Built-in lists, replaced by any `candidate_overrides` in the config.
    /// Company names start empty and are filled from the directory.
    pub fn with_defaults(config: &Config) -> Self {
        let mut registry = Self::default();
        for (field, builtin) in [
            (FieldId::Currency, CURRENCIES),
            (FieldId::Country, COUNTRIES),
            (FieldId::ShippingMethod, SHIPPING_METHODS),
        ] {
            let list = match config.candidate_overrides.get(field.as_str()) {
                Some(values) => CandidateList::new(values.iter().cloned()),
                None => CandidateList::new(builtin.iter().copied()),
            };
            registry.set(field, list);
        }
        registry
    }

    pub fn set(&mut self, field: FieldId, list: CandidateList) {
        self.lists.insert(field, list);
    }

    pub fn list(&self, field: FieldId) -> &[String] {
        self.lists
            .get(&field)
            .map(CandidateProvider::candidates)
            .unwrap_or(&[])
    }
}

/// Case-insensitive prefix match preserving candidate order. Blank text
/// matches nothing.
pub fn filter_candidates(candidates: &[String], text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let needle = text.to_lowercase();
    candidates
        .iter()
        .filter(|candidate| candidate.to_lowercase().starts_with(&needle))
        .cloned()
        .collect()
}
