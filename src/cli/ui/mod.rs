pub mod typeahead_prompt;

pub use typeahead_prompt::{PromptResult, SessionTarget, StandaloneTarget, TypeaheadPrompt, TypeaheadTarget};
