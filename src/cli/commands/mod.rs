use std::collections::HashMap;

pub mod company;
pub mod line;
pub mod quote;
pub mod system;
pub mod typeahead;

use super::context::ShellContext;
use super::errors::{CommandError, CommandResult};

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(quote::definitions());
    commands.extend(line::definitions());
    commands.extend(company::definitions());
    commands.extend(typeahead::definitions());
    commands.extend(system::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

/// Parses a 1-based line number into a ledger index.
pub(crate) fn parse_line_number(raw: &str) -> Result<usize, CommandError> {
    match raw.parse::<usize>() {
        Ok(number) if number > 0 => Ok(number - 1),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{}` is not a line number (lines start at 1)",
            raw
        ))),
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<i64, CommandError> {
    raw.trim_start_matches('#')
        .parse::<i64>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{}` is not a valid id", raw)))
}

pub(crate) fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {}", text))
}
