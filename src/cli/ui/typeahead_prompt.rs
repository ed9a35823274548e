use std::io::{self, Write};

use colored::Colorize;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    queue,
    terminal::{self, ClearType},
};

use crate::errors::Result;
use crate::session::QuoteSession;
use crate::typeahead::{FieldId, Key, KeyOutcome, TypeaheadEngine};

const FOOTER_HINT: &str = "Type to filter, ↑ ↓ to highlight, Enter to pick or accept, Esc to close, Tab to leave.";
const MAX_VISIBLE: usize = 8;

/// A text field whose suggestions are driven by a [`TypeaheadEngine`].
pub trait TypeaheadTarget {
    fn field(&self) -> FieldId;
    fn text(&self) -> String;
    fn input(&mut self, text: &str) -> Result<()>;
    fn key(&mut self, key: Key) -> Result<KeyOutcome>;
    fn suggestions(&self) -> &[String];
    fn highlighted(&self) -> Option<usize>;
}

/// A field of the open quote draft.
pub struct SessionTarget<'a> {
    session: &'a mut QuoteSession,
    field: FieldId,
}

impl<'a> SessionTarget<'a> {
    pub fn new(session: &'a mut QuoteSession, field: FieldId) -> Self {
        Self { session, field }
    }
}

impl TypeaheadTarget for SessionTarget<'_> {
    fn field(&self) -> FieldId {
        self.field
    }

    fn text(&self) -> String {
        self.session
            .field_text(self.field)
            .map(str::to_string)
            .unwrap_or_default()
    }

    fn input(&mut self, text: &str) -> Result<()> {
        self.session.input(self.field, text)
    }

    fn key(&mut self, key: Key) -> Result<KeyOutcome> {
        self.session.key(self.field, key)
    }

    fn suggestions(&self) -> &[String] {
        self.session.typeahead().suggestions()
    }

    fn highlighted(&self) -> Option<usize> {
        self.session.typeahead().highlighted()
    }
}

/// A field outside the quote draft, e.g. a company's country. Fields of one
/// form share a single engine; creating a target moves the engine to its field.
pub struct StandaloneTarget<'a> {
    engine: &'a mut TypeaheadEngine,
    field: FieldId,
    text: String,
    candidates: &'a [String],
}

impl<'a> StandaloneTarget<'a> {
    pub fn new(engine: &'a mut TypeaheadEngine, field: FieldId, candidates: &'a [String]) -> Self {
        engine.focus(field, "", candidates);
        Self {
            engine,
            field,
            text: String::new(),
            candidates,
        }
    }
}

impl TypeaheadTarget for StandaloneTarget<'_> {
    fn field(&self) -> FieldId {
        self.field
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn input(&mut self, text: &str) -> Result<()> {
        self.text = text.to_string();
        self.engine.input(self.field, text, self.candidates);
        Ok(())
    }

    fn key(&mut self, key: Key) -> Result<KeyOutcome> {
        let outcome = self.engine.key(self.field, key);
        if let KeyOutcome::Selected(value) = &outcome {
            self.text = value.clone();
        }
        Ok(outcome)
    }

    fn suggestions(&self) -> &[String] {
        if self.engine.is_open(self.field) {
            self.engine.suggestions()
        } else {
            &[]
        }
    }

    fn highlighted(&self) -> Option<usize> {
        self.engine
            .highlighted()
            .filter(|_| self.engine.is_open(self.field))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    Accepted(String),
    Cancelled,
}

/// Single-line input with a live suggestion list under it.
pub struct TypeaheadPrompt<T> {
    label: String,
    target: T,
    notice: Option<String>,
}

impl<T: TypeaheadTarget> TypeaheadPrompt<T> {
    pub fn new(label: impl Into<String>, target: T) -> Self {
        Self {
            label: label.into(),
            target,
            notice: None,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Last rejected edit, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Applies one key. Returns the final result once the prompt is done.
    pub fn handle(&mut self, code: KeyCode) -> Option<PromptResult> {
        match code {
            KeyCode::Char(ch) => {
                let mut text = self.target.text();
                text.push(ch);
                self.edit(&text);
                None
            }
            KeyCode::Backspace => {
                let mut text = self.target.text();
                text.pop();
                self.edit(&text);
                None
            }
            KeyCode::Up => self.navigate(Key::Up),
            KeyCode::Down => self.navigate(Key::Down),
            KeyCode::Enter => match self.press(Key::Enter) {
                Some(KeyOutcome::Submit) => Some(PromptResult::Accepted(self.target.text())),
                _ => None,
            },
            KeyCode::Esc => match self.press(Key::Escape) {
                Some(KeyOutcome::Ignored) => Some(PromptResult::Cancelled),
                _ => None,
            },
            KeyCode::Tab => Some(PromptResult::Accepted(self.target.text())),
            _ => None,
        }
    }

    pub fn run(&mut self) -> io::Result<PromptResult> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        let result = self.event_loop(&mut stdout);
        queue!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::FromCursorDown)
        )
        .ok();
        stdout.flush().ok();
        terminal::disable_raw_mode()?;
        if let Ok(PromptResult::Accepted(text)) = &result {
            println!("{}: {}", self.label, text);
        }
        result
    }

    /// Feeds scripted keys instead of reading the terminal. Running out of
    /// keys accepts the current text.
    pub fn run_simulated(&mut self, keys: &[KeyCode]) -> PromptResult {
        for key in keys {
            if let Some(result) = self.handle(*key) {
                return result;
            }
        }
        PromptResult::Accepted(self.target.text())
    }

    fn event_loop(&mut self, stdout: &mut io::Stdout) -> io::Result<PromptResult> {
        loop {
            self.draw(stdout)?;
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Ok(PromptResult::Cancelled);
            }
            if let Some(result) = self.handle(key.code) {
                return Ok(result);
            }
        }
    }

    fn draw(&self, stdout: &mut io::Stdout) -> io::Result<()> {
        let text = self.target.text();
        let input_line = format!("{}: {}", self.label, text);
        queue!(
            stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::FromCursorDown)
        )?;
        write!(stdout, "{}", input_line)?;

        let mut extra = 0u16;
        for (index, suggestion) in self.target.suggestions().iter().take(MAX_VISIBLE).enumerate() {
            let line = if self.target.highlighted() == Some(index) {
                format!("> {}", suggestion).reversed().to_string()
            } else {
                format!("  {}", suggestion)
            };
            write!(stdout, "\r\n{}", line)?;
            extra += 1;
        }
        let hidden = self.target.suggestions().len().saturating_sub(MAX_VISIBLE);
        if hidden > 0 {
            write!(stdout, "\r\n  ({} more)", hidden)?;
            extra += 1;
        }
        if let Some(notice) = &self.notice {
            write!(stdout, "\r\n{}", notice.bright_yellow())?;
            extra += 1;
        }
        write!(stdout, "\r\n{}", FOOTER_HINT.dimmed())?;
        extra += 1;

        queue!(
            stdout,
            cursor::MoveUp(extra),
            cursor::MoveToColumn(input_line.chars().count() as u16)
        )?;
        stdout.flush()
    }

    fn edit(&mut self, text: &str) {
        self.notice = self.target.input(text).err().map(|err| err.to_string());
    }

    fn navigate(&mut self, key: Key) -> Option<PromptResult> {
        self.press(key);
        None
    }

    fn press(&mut self, key: Key) -> Option<KeyOutcome> {
        match self.target.key(key) {
            Ok(outcome) => {
                self.notice = None;
                Some(outcome)
            }
            Err(err) => {
                self.notice = Some(err.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::quote::QuoteDraft;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn countries() -> Vec<String> {
        vec!["Spain".into(), "Sweden".into(), "Switzerland".into()]
    }

    #[test]
    fn standalone_prompt_picks_highlighted_suggestion() {
        let list = countries();
        let mut engine = TypeaheadEngine::new(Duration::from_millis(100));
        let target = StandaloneTarget::new(&mut engine, FieldId::Country, &list);
        let mut prompt = TypeaheadPrompt::new("Country", target);
        let result = prompt.run_simulated(&[
            KeyCode::Char('s'),
            KeyCode::Char('w'),
            KeyCode::Up,
            KeyCode::Enter,
            KeyCode::Enter,
        ]);
        assert_eq!(result, PromptResult::Accepted("Switzerland".into()));
    }

    #[test]
    fn escape_closes_list_then_cancels() {
        let list = countries();
        let mut engine = TypeaheadEngine::new(Duration::from_millis(100));
        let target = StandaloneTarget::new(&mut engine, FieldId::Country, &list);
        let mut prompt = TypeaheadPrompt::new("Country", target);
        assert_eq!(prompt.handle(KeyCode::Char('S')), None);
        assert_eq!(prompt.handle(KeyCode::Esc), None);
        assert!(prompt.target().suggestions().is_empty());
        assert_eq!(prompt.handle(KeyCode::Esc), Some(PromptResult::Cancelled));
    }

    #[test]
    fn form_fields_share_one_engine() {
        let countries = countries();
        let methods = vec!["Sea freight".to_string(), "Air freight".to_string()];
        let mut engine = TypeaheadEngine::new(Duration::from_millis(100));

        let country = {
            let target = StandaloneTarget::new(&mut engine, FieldId::Country, &countries);
            let mut prompt = TypeaheadPrompt::new("Country", target);
            prompt.run_simulated(&[KeyCode::Char('s'), KeyCode::Char('p')])
        };
        assert_eq!(country, PromptResult::Accepted("sp".into()));
        assert!(engine.is_open(FieldId::Country));

        let target = StandaloneTarget::new(&mut engine, FieldId::ShippingMethod, &methods);
        assert!(target.suggestions().is_empty());
        let mut prompt = TypeaheadPrompt::new("Shipping method", target);
        let method = prompt.run_simulated(&[KeyCode::Char('a'), KeyCode::Down, KeyCode::Enter]);
        assert_eq!(method, PromptResult::Accepted("Air freight".into()));
        assert_eq!(engine.active_field(), None);
    }

    #[test]
    fn session_prompt_writes_currency_into_draft() {
        let draft = QuoteDraft::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let mut session = QuoteSession::new(draft, &Config::default());
        {
            let target = SessionTarget::new(&mut session, FieldId::Currency);
            let mut prompt = TypeaheadPrompt::new("Currency", target);
            let result = prompt.run_simulated(&[
                KeyCode::Char('k'),
                KeyCode::Down,
                KeyCode::Enter,
                KeyCode::Enter,
            ]);
            assert_eq!(result, PromptResult::Accepted("KRW".into()));
        }
        assert_eq!(session.draft().header().currency, "KRW");
    }
}
