use dialoguer::Confirm;

use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output::{self, Align};
use crate::quote::{parse_date, DraftMode, HeaderField, QuoteDraft};
use crate::sync::SubmitOutcome;

use super::{parse_id, usage, CommandDefinition};

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("new", "Start a new quote draft", "new [YYYY-MM-DD]", cmd_new),
        CommandDefinition::new("edit", "Open a saved quote for editing", "edit <id>", cmd_edit),
        CommandDefinition::new(
            "set",
            "Set a header field (date, quotation_number, company_name, currency, vat_rate, memo, remarks)",
            "set <field> <value>",
            cmd_set,
        ),
        CommandDefinition::new("show", "Show the open draft", "show", cmd_show),
        CommandDefinition::new("totals", "Show the draft totals", "totals", cmd_totals),
        CommandDefinition::new("submit", "Save the open draft", "submit", cmd_submit),
        CommandDefinition::new("cancel", "Discard the open draft", "cancel", cmd_cancel),
        CommandDefinition::new(
            "list",
            "List saved quotes, newest first",
            "list [company filter]",
            cmd_list,
        ),
        CommandDefinition::new("delete", "Delete saved quotes", "delete <id>...", cmd_delete),
    ]
}

fn cmd_new(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let date = match args.first() {
        Some(raw) => parse_date(raw)?,
        None => ShellContext::today(),
    };
    context.open_session(QuoteDraft::new(date))?;
    output::success(format!("New quote draft started for {}.", date));
    Ok(())
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [raw] = args else {
        return Err(usage("edit <id>"));
    };
    let id = parse_id(raw)?;
    let persisted = context.block_on(context.sync().load(id))?;
    let lines = persisted.lines.len();
    context.open_session(persisted.into_draft())?;
    output::success(format!("Editing quote #{} ({} saved lines).", id, lines));
    Ok(())
}

fn cmd_set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage("set <field> <value>"));
    }
    let field: HeaderField = args[0].parse()?;
    let value = args[1..].join(" ");
    context
        .session_mut()?
        .draft_mut()
        .set_header_field(field, &value)?;
    output::info(format!("{} = {}", field, value));
    if field == HeaderField::VatRate {
        cmd_totals(context, &[])?;
    }
    Ok(())
}

fn cmd_show(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let draft = context.session()?.draft();
    let header = draft.header();
    let title = match draft.mode() {
        DraftMode::Create => "New quote".to_string(),
        DraftMode::Edit(id) => format!("Quote #{}", id),
    };
    output::section(title);
    let company = match header.company_reference {
        Some(id) => format!("{} (company #{})", header.company_name, id),
        None => header.company_name.clone(),
    };
    for (label, value) in [
        ("Date", header.date.to_string()),
        ("Number", header.quotation_number.clone()),
        ("Company", company),
        ("Currency", header.currency.clone()),
        ("VAT rate", format!("{}%", header.vat_rate())),
        ("Memo", header.memo.clone()),
        ("Remarks", header.remarks.clone()),
    ] {
        output::info(format!("  {:<9}: {}", label, value));
    }
    super::line::print_lines(context)?;
    cmd_totals(context, &[])
}

fn cmd_totals(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let header = context.session()?.draft().header();
    output::info(format!("  Subtotal : {}", context.money(header.subtotal())));
    output::info(format!(
        "  VAT      : {} ({}%)",
        context.money(header.vat_amount()),
        header.vat_rate()
    ));
    output::info(format!("  Total    : {}", context.money(header.total_amount())));
    Ok(())
}

fn cmd_submit(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    submit(context)
}

pub(crate) fn submit(context: &mut ShellContext) -> CommandResult {
    let receipt = {
        let session = context.session()?;
        context.block_on(session.submit(context.sync()))?
    };
    context.take_session();
    let verb = match receipt.outcome {
        SubmitOutcome::Created => "created",
        SubmitOutcome::Updated => "updated",
    };
    output::success(format!(
        "Quote #{} {} with {} line{}. Total {}.",
        receipt.quote_id,
        verb,
        receipt.line_count,
        if receipt.line_count == 1 { "" } else { "s" },
        context.money(receipt.totals.total_amount)
    ));
    Ok(())
}

fn cmd_cancel(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let session = context.take_session().ok_or(CommandError::NoDraft)?;
    session.cancel();
    output::info("Draft discarded.");
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let filter = args.join(" ");
    let filter = Some(filter.as_str()).filter(|term| !term.is_empty());
    let quotes = context.block_on(context.sync().list(filter))?;
    if quotes.is_empty() {
        output::info("No quotes found.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = quotes
        .iter()
        .map(|quote| {
            vec![
                quote.id.map(|id| id.to_string()).unwrap_or_default(),
                quote.date.to_string(),
                quote.quotation_number.clone().unwrap_or_default(),
                quote.company_name.clone(),
                quote.currency.clone(),
                context.money(quote.total_amount),
            ]
        })
        .collect();
    output::render_table(
        &[
            ("id", Align::Right),
            ("date", Align::Left),
            ("number", Align::Left),
            ("company", Align::Left),
            ("currency", Align::Left),
            ("total", Align::Right),
        ],
        &rows,
    );
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() {
        return Err(usage("delete <id>..."));
    }
    let ids = args
        .iter()
        .map(|raw| parse_id(raw))
        .collect::<Result<Vec<_>, _>>()?;
    if context.can_prompt() {
        let confirmed = Confirm::with_theme(&context.theme)
            .with_prompt(format!(
                "Delete {} quote{}? This cannot be undone.",
                ids.len(),
                if ids.len() == 1 { "" } else { "s" }
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            output::info("Operation cancelled.");
            return Ok(());
        }
    }
    let removed = context.block_on(context.sync().delete(&ids))?;
    output::success(format!("Deleted {} quote{}.", removed, if removed == 1 { "" } else { "s" }));
    Ok(())
}
