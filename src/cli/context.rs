use std::{future::Future, sync::Arc};

use chrono::Local;
use dialoguer::theme::ColorfulTheme;
use strsim::levenshtein;
use tokio::runtime::{Builder, Runtime};
use tracing::info;

use crate::{
    company::StoreDirectory,
    config::{Config, ConfigManager},
    currency::format_amount,
    errors::QuoteError,
    quote::{DraftMode, QuoteDraft},
    session::QuoteSession,
    storage::JsonTableStore,
    sync::QuoteSynchronizer,
};

use super::commands::{all_definitions, CommandDefinition, CommandRegistry};
use super::errors::{CliError, CommandError};
use super::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub last_command: Option<String>,
    pub running: bool,
    runtime: Runtime,
    sync: QuoteSynchronizer<JsonTableStore>,
    directory: StoreDirectory<JsonTableStore>,
    session: Option<QuoteSession>,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?)
    }

    pub fn with_config_manager(mode: CliMode, config_manager: ConfigManager) -> Result<Self, CliError> {
        let config = config_manager.load()?;
        let store_path = config.store_path_in(config_manager.base_dir());
        let store = Arc::new(JsonTableStore::open(&store_path).map_err(QuoteError::from)?);
        info!(path = %store_path.display(), "table store opened");
        let runtime = Builder::new_current_thread().enable_all().build()?;

        Ok(Self {
            mode,
            registry: CommandRegistry::new(all_definitions()),
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            last_command: None,
            running: true,
            runtime,
            sync: QuoteSynchronizer::new(Arc::clone(&store)),
            directory: StoreDirectory::new(store),
            session: None,
        })
    }

    /// Drives a store future to completion on the shell's runtime.
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    pub(crate) fn sync(&self) -> &QuoteSynchronizer<JsonTableStore> {
        &self.sync
    }

    pub(crate) fn directory(&self) -> &StoreDirectory<JsonTableStore> {
        &self.directory
    }

    pub(crate) fn session(&self) -> Result<&QuoteSession, CommandError> {
        self.session.as_ref().ok_or(CommandError::NoDraft)
    }

    pub(crate) fn session_mut(&mut self) -> Result<&mut QuoteSession, CommandError> {
        self.session.as_mut().ok_or(CommandError::NoDraft)
    }

    pub(crate) fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Starts a session around `draft`, replacing any open one.
    pub(crate) fn open_session(&mut self, draft: QuoteDraft) -> Result<(), CommandError> {
        let mut session = QuoteSession::new(draft, &self.config);
        let loaded = self.block_on(session.load_companies(&self.directory))?;
        if let Some(previous) = self.session.replace(session) {
            output::warning("Discarded the previous unsaved draft.");
            previous.cancel();
        }
        info!(companies = loaded, "quote session opened");
        Ok(())
    }

    /// Reloads the open session's companies from the directory.
    pub(crate) fn refresh_companies(&mut self) -> Result<usize, CommandError> {
        let session = self.session.as_mut().ok_or(CommandError::NoDraft)?;
        Ok(self.runtime.block_on(session.load_companies(&self.directory))?)
    }

    pub(crate) fn take_session(&mut self) -> Option<QuoteSession> {
        self.session.take()
    }

    pub(crate) fn today() -> chrono::NaiveDate {
        Local::now().date_naive()
    }

    pub(crate) fn money(&self, value: f64) -> String {
        format_amount(value, self.config.display_precision)
    }

    pub(crate) fn persist_config(&self) -> Result<(), CommandError> {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        match self.session.as_ref().map(|session| session.draft().mode()) {
            Some(DraftMode::Create) => "quote[new]> ".into(),
            Some(DraftMode::Edit(id)) => format!("quote[#{}]> ", id),
            None => "quote> ".into(),
        }
    }

    pub(crate) fn can_prompt(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.get(command).map(|definition| definition.handler) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let mut suggestions: Vec<_> = self
            .registry
            .names()
            .map(|key| (levenshtein(key, input), key))
            .collect();
        suggestions.sort_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = suggestions.first() {
            if *distance <= 3 {
                output::hint(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        let prompt = if self.has_session() {
            "Exit and discard the open draft?"
        } else {
            "Exit shell?"
        };
        dialoguer::Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|err| CliError::Command(err.to_string()))
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                output::error(message);
                output::hint("Use `help <command>` for usage details.");
            }
            CommandError::NoDraft => {
                output::error(CommandError::NoDraft);
                output::hint("Try `new` to start a quote.");
            }
            CommandError::Quote(err) if err.is_user_notice() => output::warning(notice_text(&err)),
            CommandError::Quote(err @ QuoteError::LinesMissing { .. }) => {
                output::error(&err);
                output::hint(self.lines_missing_hint());
            }
            other => output::error(other),
        }
        Ok(())
    }

    /// Recovery advice after a header was saved without its lines.
    pub(crate) fn lines_missing_hint(&self) -> &'static str {
        match self.session.as_ref().map(|session| session.draft().mode()) {
            Some(DraftMode::Edit(_)) => {
                "The draft is still open. Run `submit` again to rewrite the quote's lines."
            }
            _ => "The draft is still open. Remove the partial quote with `delete <id>` before resubmitting a new one.",
        }
    }
}

/// Operator-facing wording for a correctable error. Line numbers are 1-based.
fn notice_text(err: &QuoteError) -> String {
    match err {
        QuoteError::OutOfRange { index, len } => format!(
            "Line {} does not exist (the quote has {} line{}).",
            index + 1,
            len,
            if *len == 1 { "" } else { "s" }
        ),
        QuoteError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{LineLedger, QuoteHeader};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()
    }

    #[test]
    fn lines_missing_hint_follows_draft_mode() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut context = ShellContext::with_config_manager(CliMode::Script, manager).unwrap();

        context.open_session(QuoteDraft::new(date())).unwrap();
        assert!(context.lines_missing_hint().contains("delete <id>"));

        let draft = QuoteDraft::from_parts(
            QuoteHeader::new(date()),
            LineLedger::new(),
            DraftMode::Edit(3),
        );
        context.open_session(draft).unwrap();
        let hint = context.lines_missing_hint();
        assert!(hint.contains("submit"));
        assert!(!hint.contains("delete"));
    }

    #[test]
    fn notices_use_one_based_line_numbers() {
        let err = QuoteError::OutOfRange { index: 2, len: 1 };
        assert!(err.is_user_notice());
        assert_eq!(notice_text(&err), "Line 3 does not exist (the quote has 1 line).");
        assert_eq!(
            notice_text(&QuoteError::Validation("bad rate".into())),
            "bad rate"
        );
        assert!(!QuoteError::NotFound(4).is_user_notice());
    }
}
