use std::time::{Duration, Instant};

use tracing::debug;

use super::candidates::{filter_candidates, CandidateProvider};
use super::field::FieldId;

/// Navigation keys understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Enter,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeaheadState {
    Idle,
    Suggesting,
}

/// What the caller should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not handled; the key keeps its default behavior.
    Ignored,
    /// Highlight moved; default cursor movement is suppressed.
    Navigated { highlighted: usize },
    /// Write this value into the field. The list is closed.
    Selected(String),
    /// Nothing highlighted: the key belongs to the surrounding form.
    Submit,
    /// Suggestions closed, field value untouched.
    Dismissed,
}

/// Suggestion state shared by every typeahead field of a form.
///
/// At most one field is active at a time. Blur does not close the list
/// immediately: it schedules a dismissal that [`TypeaheadEngine::tick`]
/// applies once the grace window has elapsed, so a click that arrives
/// inside the window still commits.
#[derive(Debug, Clone)]
pub struct TypeaheadEngine {
    active: Option<FieldId>,
    suggestions: Vec<String>,
    highlighted: Option<usize>,
    pending_dismissal: Option<Instant>,
    grace: Duration,
}

impl TypeaheadEngine {
    pub fn new(grace: Duration) -> Self {
        Self {
            active: None,
            suggestions: Vec::new(),
            highlighted: None,
            pending_dismissal: None,
            grace,
        }
    }

    pub fn state(&self) -> TypeaheadState {
        if self.active.is_some() {
            TypeaheadState::Suggesting
        } else {
            TypeaheadState::Idle
        }
    }

    pub fn active_field(&self) -> Option<FieldId> {
        self.active
    }

    pub fn is_open(&self, field: FieldId) -> bool {
        self.active == Some(field)
    }

    /// Suggestions currently shown; empty while idle.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn pending_dismissal(&self) -> Option<Instant> {
        self.pending_dismissal
    }

    /// Field text changed.
    pub fn input<P>(&mut self, field: FieldId, text: &str, provider: &P)
    where
        P: CandidateProvider + ?Sized,
    {
        if text.is_empty() {
            if self.is_open(field) {
                self.close();
            }
            debug!(field = %field, "typeahead cleared");
            return;
        }
        self.open(field, filter_candidates(provider.candidates(), text));
    }

    /// Field gained focus; non-empty text re-derives suggestions.
    pub fn focus<P>(&mut self, field: FieldId, text: &str, provider: &P)
    where
        P: CandidateProvider + ?Sized,
    {
        if !text.is_empty() {
            self.open(field, filter_candidates(provider.candidates(), text));
        } else if self.active.is_some_and(|active| active != field) {
            self.close();
        } else if self.is_open(field) {
            self.pending_dismissal = None;
        }
    }

    pub fn key(&mut self, field: FieldId, key: Key) -> KeyOutcome {
        self.key_at(field, key, Instant::now())
    }

    /// Key press at `now`. A dismissal already due is applied first, so keys
    /// never navigate a list that should have closed.
    pub fn key_at(&mut self, field: FieldId, key: Key, now: Instant) -> KeyOutcome {
        self.tick(now);
        if !self.is_open(field) {
            return match key {
                Key::Enter => KeyOutcome::Submit,
                _ => KeyOutcome::Ignored,
            };
        }
        let len = self.suggestions.len();
        match key {
            Key::Down | Key::Up if len == 0 => KeyOutcome::Ignored,
            Key::Down => {
                let next = match self.highlighted {
                    Some(index) => (index + 1) % len,
                    None => 0,
                };
                self.highlight(next)
            }
            Key::Up => {
                let next = match self.highlighted {
                    Some(index) => (index + len - 1) % len,
                    None => len - 1,
                };
                self.highlight(next)
            }
            Key::Enter => match self.highlighted {
                Some(index) => self.commit(index),
                None => KeyOutcome::Submit,
            },
            Key::Escape => {
                self.close();
                debug!(field = %field, "typeahead dismissed");
                KeyOutcome::Dismissed
            }
        }
    }

    /// Pointer moved over a suggestion.
    pub fn hover(&mut self, field: FieldId, index: usize) -> bool {
        self.hover_at(field, index, Instant::now())
    }

    pub fn hover_at(&mut self, field: FieldId, index: usize, now: Instant) -> bool {
        self.tick(now);
        if self.is_open(field) && index < self.suggestions.len() {
            self.highlighted = Some(index);
            true
        } else {
            false
        }
    }

    /// Suggestion clicked. Commits unless a scheduled dismissal already
    /// expired before `now`.
    pub fn click(&mut self, field: FieldId, index: usize, now: Instant) -> Option<String> {
        self.tick(now);
        if !self.is_open(field) || index >= self.suggestions.len() {
            return None;
        }
        match self.commit(index) {
            KeyOutcome::Selected(value) => Some(value),
            _ => None,
        }
    }

    /// Field lost focus; schedule dismissal after the grace window.
    pub fn blur(&mut self, field: FieldId, now: Instant) {
        if self.is_open(field) {
            self.pending_dismissal = Some(now + self.grace);
        }
    }

    /// Applies a due dismissal. Returns `true` when the list was closed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.pending_dismissal {
            Some(deadline) if now >= deadline => {
                debug!(field = ?self.active, "typeahead dismissed after blur");
                self.close();
                true
            }
            _ => false,
        }
    }

    fn open(&mut self, field: FieldId, suggestions: Vec<String>) {
        debug!(field = %field, suggestions = suggestions.len(), "typeahead suggesting");
        self.active = Some(field);
        self.suggestions = suggestions;
        self.highlighted = None;
        self.pending_dismissal = None;
    }

    fn highlight(&mut self, index: usize) -> KeyOutcome {
        self.highlighted = Some(index);
        KeyOutcome::Navigated { highlighted: index }
    }

    fn commit(&mut self, index: usize) -> KeyOutcome {
        let value = self.suggestions[index].clone();
        debug!(field = ?self.active, value = %value, "typeahead selected");
        self.close();
        KeyOutcome::Selected(value)
    }

    fn close(&mut self) {
        self.active = None;
        self.suggestions.clear();
        self.highlighted = None;
        self.pending_dismissal = None;
    }
}
