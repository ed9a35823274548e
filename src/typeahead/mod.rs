//! Field autocomplete: candidate sources plus a single engine shared by every
//! typeahead-enabled field of a form.

pub mod candidates;
pub mod catalog;
pub mod engine;
pub mod field;

pub use candidates::{filter_candidates, CandidateList, CandidateProvider, CandidateRegistry};
pub use engine::{Key, KeyOutcome, TypeaheadEngine, TypeaheadState};
pub use field::FieldId;
