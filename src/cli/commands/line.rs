use crate::cli::context::ShellContext;
use crate::cli::errors::CommandResult;
use crate::cli::output::{self, Align};
use crate::quote::LineField;

use super::{parse_line_number, usage, CommandDefinition};

const USAGE: &str = "line [list|add|set <n> <field> <value>|remove <n>]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "line",
        "Edit the draft's line items",
        USAGE,
        cmd_line,
    )]
}

fn cmd_line(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|action| action.to_ascii_lowercase()).as_deref() {
        None | Some("list") => print_lines(context),
        Some("add") => {
            let index = context.session_mut()?.draft_mut().add_line();
            output::info(format!("Line {} added.", index + 1));
            Ok(())
        }
        Some("set") => {
            if args.len() < 3 {
                return Err(usage("line set <n> <field> <value>"));
            }
            let index = parse_line_number(args[1])?;
            let field: LineField = args[2].parse()?;
            let value = args[3..].join(" ");
            let (amount, total) = {
                let draft = context.session_mut()?.draft_mut();
                draft.set_line_field(index, field, &value)?;
                (draft.ledger().line(index)?.amount(), draft.totals().total_amount)
            };
            if field.is_numeric() {
                output::info(format!(
                    "Line {} amount {}; quote total {}.",
                    index + 1,
                    context.money(amount),
                    context.money(total)
                ));
            }
            Ok(())
        }
        Some("remove") => {
            let [_, raw] = args else {
                return Err(usage("line remove <n>"));
            };
            let index = parse_line_number(raw)?;
            let removed = context.session_mut()?.draft_mut().remove_line(index)?;
            let label = if removed.item_name.is_empty() {
                String::new()
            } else {
                format!(" ({})", removed.item_name)
            };
            output::info(format!("Line {}{} removed.", index + 1, label));
            Ok(())
        }
        Some(_) => Err(usage(USAGE)),
    }
}

pub(crate) fn print_lines(context: &ShellContext) -> CommandResult {
    let draft = context.session()?.draft();
    let rows: Vec<Vec<String>> = draft
        .lines()
        .iter()
        .enumerate()
        .map(|(index, line)| {
            vec![
                (index + 1).to_string(),
                line.item_name.clone(),
                line.model_name.clone(),
                line.description.clone(),
                line.quantity().to_string(),
                context.money(line.unit_price()),
                context.money(line.amount()),
            ]
        })
        .collect();
    output::render_table(
        &[
            ("#", Align::Right),
            ("item", Align::Left),
            ("model", Align::Left),
            ("description", Align::Left),
            ("qty", Align::Right),
            ("unit price", Align::Right),
            ("amount", Align::Right),
        ],
        &rows,
    );
    Ok(())
}
