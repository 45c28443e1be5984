use crate::cli::commands::report::{self, EMPTY_LEDGER};
use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::forms::{self, FormResult, ADD_USAGE};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::errors::LedgerError;
use crate::ledger::{Category, Entry, EntryId, Ledger, PaymentMethod};

const DELETE_USAGE: &str = "delete [<index>...|#<id>...]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("add", "Record an income or expense", ADD_USAGE, cmd_add),
        CommandEntry::new(
            "entry",
            "Entry operations (add, delete)",
            "entry <add|delete> [args...]",
            cmd_entry,
        ),
        CommandEntry::new(
            "delete",
            "Delete entries by position or id",
            DELETE_USAGE,
            cmd_delete,
        ),
        CommandEntry::new(
            "categories",
            "List the recognized categories",
            "categories",
            cmd_categories,
        ),
        CommandEntry::new(
            "payments",
            "List the recognized payment methods",
            "payments",
            cmd_payments,
        ),
    ]
}

fn cmd_entry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(
            "usage: entry <add|delete> [args...]".into(),
        ));
    };
    match action.to_lowercase().as_str() {
        "add" => cmd_add(context, rest),
        "delete" => cmd_delete(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown entry action `{other}`"
        ))),
    }
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let entry = if args.is_empty() {
        if context.mode() != CliMode::Interactive {
            return Err(CommandError::InvalidArguments(format!("usage: {ADD_USAGE}")));
        }
        match forms::run_entry_form(context)? {
            FormResult::Completed(entry) => entry,
            FormResult::Cancelled => {
                io::print_info("Entry cancelled.");
                return Ok(());
            }
        }
    } else {
        forms::entry_from_args(args, &context.config)?
    };

    let id = context.session.ledger_mut().append(entry)?;
    tracing::info!(%id, "entry recorded");
    io::print_success("Entry added!");
    redraw(context);
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(ledger) = context.session.view() else {
        io::print_warning(EMPTY_LEDGER);
        return Ok(());
    };

    let removed = if args.is_empty() {
        if !context.can_prompt() {
            return Err(CommandError::InvalidArguments(format!(
                "usage: {DELETE_USAGE}"
            )));
        }
        let labels = delete_options(context, ledger);
        let Some(picked) = context.choose_many("Select entries to delete", &labels)? else {
            io::print_info("Deletion cancelled.");
            return Ok(());
        };
        // Positions are only valid for this listing; commit by id.
        let ids: Vec<EntryId> = picked
            .iter()
            .filter_map(|&index| ledger.get(index).map(|entry| entry.id))
            .collect();
        context.session.ledger_mut().delete_by_ids(&ids)?
    } else {
        let tokens = split_tokens(args);
        let by_id = tokens.iter().filter(|token| token.starts_with('#')).count();
        if by_id == tokens.len() {
            let ids = resolve_ids(ledger, &tokens)?;
            context.session.ledger_mut().delete_by_ids(&ids)?
        } else if by_id == 0 {
            let indices = parse_indices(&tokens, ledger.len())?;
            context.session.ledger_mut().delete_by_indices(&indices)?
        } else {
            return Err(CommandError::InvalidArguments(
                "mix of positions and `#id` references; use one form per command".into(),
            ));
        }
    };

    if removed == 0 {
        io::print_info("Nothing selected; no entries deleted.");
        return Ok(());
    }
    io::print_success(format!("{removed} entry(ies) deleted successfully!"));
    redraw(context);
    Ok(())
}

fn cmd_categories(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("Categories");
    for category in Category::STANDARD.iter() {
        io::print_info(format!("  {category}"));
    }
    if context.config.allow_custom_categories {
        io::print_hint("Other names are accepted as custom categories.");
    }
    Ok(())
}

fn cmd_payments(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("Payment methods");
    for method in PaymentMethod::STANDARD.iter() {
        io::print_info(format!("  {method}"));
    }
    if context.config.allow_custom_payment_methods {
        io::print_hint("Other names are accepted as custom payment methods.");
    }
    Ok(())
}

fn redraw(context: &ShellContext) {
    if context.config.auto_redraw {
        report::render_dashboard(context);
    }
}

/// `i | date | kind | description | category | payment | amount` per entry.
fn delete_options(context: &ShellContext, ledger: &Ledger) -> Vec<String> {
    ledger
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| delete_option(context, index, entry))
        .collect()
}

fn delete_option(context: &ShellContext, index: usize, entry: &Entry) -> String {
    format!(
        "{} | {} | {} | {} | {} | {} | {}",
        index,
        context.format_date(entry.date),
        entry.kind,
        entry.description,
        entry.category,
        entry.payment_method,
        context.format_amount(entry.amount)
    )
}

fn split_tokens<'a>(args: &[&'a str]) -> Vec<&'a str> {
    args.iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

fn parse_indices(tokens: &[&str], len: usize) -> Result<Vec<usize>, CommandError> {
    tokens
        .iter()
        .map(|token| {
            let index: i64 = token.parse().map_err(|_| {
                CommandError::InvalidArguments(format!("`{token}` is not an entry index"))
            })?;
            usize::try_from(index)
                .map_err(|_| CommandError::from(LedgerError::OutOfRange { index, len }))
        })
        .collect()
}

fn resolve_ids(ledger: &Ledger, tokens: &[&str]) -> Result<Vec<EntryId>, CommandError> {
    tokens
        .iter()
        .map(|token| {
            let prefix = token.trim_start_matches('#');
            ledger.find_by_prefix(prefix).ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "no single entry matches id `{prefix}` (see `list`)"
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_accept_commas_and_spaces() {
        assert_eq!(split_tokens(&["0,2", " 3", ","]), vec!["0", "2", "3"]);
    }

    #[test]
    fn negative_positions_are_out_of_range() {
        let err = parse_indices(&["-1"], 3).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Ledger(LedgerError::OutOfRange { index: -1, len: 3 })
        ));
        assert!(matches!(
            parse_indices(&["two"], 3).unwrap_err(),
            CommandError::InvalidArguments(_)
        ));
        assert_eq!(parse_indices(&["0", "2"], 3).unwrap(), vec![0, 2]);
    }
}
