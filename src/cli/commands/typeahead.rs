use std::time::Instant;

use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output;
use crate::cli::ui::{PromptResult, SessionTarget, TypeaheadPrompt};
use crate::company::CompanyDirectory;
use crate::typeahead::{filter_candidates, CandidateList, CandidateRegistry, FieldId, Key, KeyOutcome};

use super::{usage, CommandDefinition};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "suggest",
            "List suggestions for a field without changing the draft",
            "suggest <currency|country|shipping_method|company_name> <text>",
            cmd_suggest,
        ),
        CommandDefinition::new(
            "type",
            "Type into a draft field with live suggestions",
            "type <currency|company_name> [text]",
            cmd_type,
        ),
        CommandDefinition::new(
            "key",
            "Send a navigation key to the open suggestion list",
            "key <up|down|enter|esc>",
            cmd_key,
        ),
        CommandDefinition::new(
            "pick",
            "Pick a suggestion from the open list",
            "pick <n>",
            cmd_pick,
        ),
    ]
}

fn cmd_suggest(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(usage("suggest <field> <text>"));
    }
    let field: FieldId = args[0].parse()?;
    let text = args[1..].join(" ");
    let mut registry = CandidateRegistry::with_defaults(&context.config);
    if field == FieldId::CompanyName {
        let companies = context.block_on(context.directory().companies())?;
        registry.set(field, CandidateList::from_companies(&companies));
    }
    let suggestions = filter_candidates(registry.list(field), &text);
    if suggestions.is_empty() {
        output::info(format!("No {} starts with `{}`.", field, text));
    } else {
        print_suggestions(&suggestions, None);
    }
    Ok(())
}

fn cmd_type(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        return Err(usage("type <field> [text]"));
    };
    let field: FieldId = raw.parse()?;
    let can_prompt = context.can_prompt();
    let session = context.session_mut()?;
    session.field_text(field)?;

    if args.len() == 1 && can_prompt {
        session.focus(field)?;
        let mut prompt = TypeaheadPrompt::new(field.as_str(), SessionTarget::new(session, field));
        let result = prompt.run()?;
        if let Some(notice) = prompt.notice() {
            output::warning(notice);
        }
        if result == PromptResult::Cancelled {
            output::info("Input closed.");
        }
        return Ok(());
    }

    let text = args[1..].join(" ");
    session.input(field, &text)?;
    let engine = session.typeahead();
    if engine.is_open(field) && !engine.suggestions().is_empty() {
        print_suggestions(engine.suggestions(), engine.highlighted());
    } else {
        output::info(format!("{} = {}", field, text));
    }
    Ok(())
}

fn cmd_key(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = match args.first().map(|key| key.to_ascii_lowercase()).as_deref() {
        Some("up") => Key::Up,
        Some("down") => Key::Down,
        Some("enter") => Key::Enter,
        Some("esc") | Some("escape") => Key::Escape,
        _ => return Err(usage("key <up|down|enter|esc>")),
    };
    let session = context.session_mut()?;
    let Some(field) = session.typeahead().active_field() else {
        if key == Key::Enter {
            return super::quote::submit(context);
        }
        output::info("No suggestion list is open.");
        return Ok(());
    };
    match session.key(field, key)? {
        KeyOutcome::Navigated { highlighted } => {
            let engine = session.typeahead();
            print_suggestions(engine.suggestions(), Some(highlighted));
        }
        KeyOutcome::Selected(value) => output::info(format!("{} = {}", field, value)),
        KeyOutcome::Dismissed => output::info("Suggestions closed."),
        KeyOutcome::Submit => return super::quote::submit(context),
        KeyOutcome::Ignored => {}
    }
    Ok(())
}

fn cmd_pick(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(usage("pick <n>"));
    };
    let index = super::parse_line_number(raw)
        .map_err(|_| CommandError::InvalidArguments(format!("`{}` is not a suggestion number", raw)))?;
    let session = context.session_mut()?;
    let Some(field) = session.typeahead().active_field() else {
        return Err(CommandError::Message("No suggestion list is open.".into()));
    };
    match session.click(field, index, Instant::now())? {
        Some(value) => {
            output::info(format!("{} = {}", field, value));
            let header = session.draft().header();
            if field == FieldId::CompanyName && header.company_reference.is_some() {
                output::info(format!(
                    "Currency {}; VAT {}%.",
                    header.currency,
                    header.vat_rate()
                ));
            }
            Ok(())
        }
        None => Err(CommandError::InvalidArguments(format!(
            "there is no suggestion {}",
            raw
        ))),
    }
}

fn print_suggestions(suggestions: &[String], highlighted: Option<usize>) {
    for (index, suggestion) in suggestions.iter().enumerate() {
        let marker = if highlighted == Some(index) { ">" } else { " " };
        output::info(format!("{} {}. {}", marker, index + 1, suggestion));
    }
}
