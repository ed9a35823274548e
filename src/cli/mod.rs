//! Interactive shell over the quote composer.

pub mod commands;
mod context;
mod errors;
pub mod output;
mod shell;
pub mod ui;

pub use context::{CliMode, ShellContext};
pub use errors::{CliError, CommandError, CommandResult};
pub use shell::{run_cli, SCRIPT_ENV};
