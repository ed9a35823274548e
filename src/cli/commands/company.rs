use dialoguer::Select;
use serde_json::json;

use crate::cli::context::ShellContext;
use crate::cli::errors::{CommandError, CommandResult};
use crate::cli::output::{self, Align};
use crate::cli::ui::{PromptResult, StandaloneTarget, TypeaheadPrompt};
use crate::company::{Company, CompanyDirectory};
use crate::errors::QuoteError;
use crate::storage::{TableStore, COMPANIES_TABLE};
use crate::typeahead::{CandidateRegistry, FieldId, TypeaheadEngine};

use super::{usage, CommandDefinition};

const USAGE: &str = "company [list|search <term>|select [id|name]|add <name> [currency] [memo]]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "company",
        "Browse companies and apply one to the draft",
        USAGE,
        cmd_company,
    )]
}

fn cmd_company(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|action| action.to_ascii_lowercase()).as_deref() {
        None | Some("list") => {
            let companies = context.block_on(context.directory().companies())?;
            print_companies(&companies);
            Ok(())
        }
        Some("search") => {
            if args.len() < 2 {
                return Err(usage("company search <term>"));
            }
            let term = args[1..].join(" ");
            let companies = context.block_on(context.directory().search(&term))?;
            print_companies(&companies);
            Ok(())
        }
        Some("select") => select_company(context, &args[1..].join(" ")),
        Some("add") => add_company(context, &args[1..]),
        Some(_) => Err(usage(USAGE)),
    }
}

fn select_company(context: &mut ShellContext, term: &str) -> CommandResult {
    context.refresh_companies()?;
    let term = term.trim();
    let needle = term.to_lowercase();
    let matches: Vec<Company> = context
        .session()?
        .companies()
        .iter()
        .filter(|company| {
            needle.is_empty()
                || company.id.to_string() == needle
                || company.name.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    let chosen = match matches.as_slice() {
        [] => {
            return Err(CommandError::Message(if term.is_empty() {
                "No companies registered. Use `company add` first.".into()
            } else {
                format!("No company matches `{}`.", term)
            }))
        }
        [only] => only.id,
        many if context.can_prompt() => {
            let labels: Vec<String> = many
                .iter()
                .map(|company| format!("{} ({})", company.name, company.currency))
                .collect();
            let selection = Select::with_theme(&context.theme)
                .with_prompt("Select company")
                .items(&labels)
                .default(0)
                .interact_opt()?;
            match selection {
                Some(index) => many[index].id,
                None => {
                    output::info("Operation cancelled.");
                    return Ok(());
                }
            }
        }
        many => {
            let names: Vec<&str> = many.iter().map(|company| company.name.as_str()).collect();
            return Err(CommandError::InvalidArguments(format!(
                "`{}` matches several companies: {}",
                term,
                names.join(", ")
            )));
        }
    };

    let session = context.session_mut()?;
    let company = session.select_company(chosen)?.clone();
    let vat_rate = session.draft().header().vat_rate();
    output::success(format!(
        "Company set to {} ({}); VAT {}%.",
        company.name, company.currency, vat_rate
    ));
    Ok(())
}

fn add_company(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(name) = args.first().map(|name| name.trim()).filter(|name| !name.is_empty()) else {
        return Err(usage("company add <name> [currency] [memo]"));
    };
    let mut currency = args.get(1).map(|code| code.to_string()).unwrap_or_default();
    let memo = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
    let mut country = String::new();
    let mut shipping_method = String::new();

    if context.can_prompt() {
        let registry = CandidateRegistry::with_defaults(&context.config);
        let mut engine = TypeaheadEngine::new(context.config.blur_grace());
        let mut ask = |field: FieldId, label: &str| -> Result<String, CommandError> {
            let target = StandaloneTarget::new(&mut engine, field, registry.list(field));
            match TypeaheadPrompt::new(label, target).run()? {
                PromptResult::Accepted(text) => Ok(text),
                PromptResult::Cancelled => Ok(String::new()),
            }
        };
        if currency.is_empty() {
            currency = ask(FieldId::Currency, "Currency")?;
        }
        country = ask(FieldId::Country, "Country")?;
        shipping_method = ask(FieldId::ShippingMethod, "Shipping method")?;
    }

    let row = json!({
        "name": name,
        "currency": currency.trim().to_ascii_uppercase(),
        "memo": memo,
        "country": country,
        "shipping_method": shipping_method,
    });
    let Some(row) = row.as_object().cloned() else {
        return Err(CommandError::Message("company record is not an object".into()));
    };
    let created = context
        .block_on(context.sync().store().insert(COMPANIES_TABLE, vec![row]))
        .map_err(QuoteError::from)?;
    let id = created
        .first()
        .and_then(|row| row.get("id"))
        .and_then(|id| id.as_i64())
        .unwrap_or_default();
    output::success(format!("Company #{} `{}` registered.", id, name));
    if context.has_session() {
        context.refresh_companies()?;
    }
    Ok(())
}

fn print_companies(companies: &[Company]) {
    if companies.is_empty() {
        output::info("No companies found.");
        return;
    }
    let rows: Vec<Vec<String>> = companies
        .iter()
        .map(|company| {
            vec![
                company.id.to_string(),
                company.name.clone(),
                company.currency.clone(),
                company.country.clone(),
                company.shipping_method.clone(),
                company.memo.clone(),
            ]
        })
        .collect();
    output::render_table(
        &[
            ("id", Align::Right),
            ("name", Align::Left),
            ("currency", Align::Left),
            ("country", Align::Left),
            ("shipping", Align::Left),
            ("memo", Align::Left),
        ],
        &rows,
    );
}
