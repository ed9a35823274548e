use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output;
use crate::config::CONFIG_KEYS;
use crate::utils::build_info;

use super::{usage, CommandDefinition};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "config",
            "Show or change settings",
            "config [show|set <key> <value>]",
            cmd_config,
        ),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|action| action.to_ascii_lowercase()).as_deref() {
        None | Some("show") => {
            let config = &context.config;
            output::section("Configuration");
            output::info(format!("  File               : {}", context.config_manager.path().display()));
            output::info(format!("  domestic_currency  : {}", config.domestic_currency));
            output::info(format!("  domestic_vat_rate  : {}", config.domestic_vat_rate));
            output::info(format!("  blur_grace_ms      : {}", config.blur_grace_ms));
            output::info(format!("  display_precision  : {}", config.display_precision));
            output::info(format!(
                "  store_path         : {}",
                config
                    .store_path_in(context.config_manager.base_dir())
                    .display()
            ));
            for (field, values) in &config.candidate_overrides {
                output::info(format!("  candidates.{:<8}: {}", field, values.join(", ")));
            }
            Ok(())
        }
        Some("set") => {
            if args.len() < 3 {
                return Err(usage(&format!(
                    "config set <{}> <value>",
                    CONFIG_KEYS.join("|")
                )));
            }
            let key = args[1];
            let value = args[2..].join(" ");
            let mut updated = context.config.clone();
            updated.set(key, &value)?;
            context.config_manager.save(&updated)?;
            context.config = updated;
            output::success(format!("{} updated.", key));
            if key == "store_path" {
                output::hint("The new store is used the next time the shell starts.");
            } else if context.has_session() {
                output::hint("The open draft keeps its settings; new drafts use the new value.");
            }
            Ok(())
        }
        Some(_) => Err(usage("config [show|set <key> <value>]")),
    }
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("Quote Composer {}", meta.version));
    output::info(format!("  Build hash   : {} ({})", meta.git_hash, meta.git_status));
    output::info(format!("  Built at     : {}", meta.timestamp));
    output::info(format!("  Target       : {}", meta.target));
    output::info(format!("  Profile      : {}", meta.profile));
    output::info(format!("  Rustc        : {}", meta.rustc));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        match context.command(&name) {
            Some(command) => {
                output::info(format!("{} - {}", command.name, command.description));
                output::info(format!("usage: {}", command.usage));
            }
            None => context.suggest_command(args[0]),
        }
        return Ok(());
    }

    output::section("Commands");
    for command in context.registry.iter() {
        output::info(format!("  {:<8} {}", command.name, command.description));
        output::hint(format!("  {}", command.usage));
    }
    Ok(())
}

fn cmd_exit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if let Some(session) = context.take_session() {
        output::warning("Unsaved draft discarded.");
        session.cancel();
    }
    Err(CommandError::ExitRequested)
}
