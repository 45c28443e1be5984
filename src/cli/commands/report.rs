//! Read-only views over the session ledger: entries table, breakdown charts,
//! balance metric and the combined dashboard.

use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::ui::chart;
use crate::cli::ui::table_renderer::{Table, TableColumn};
use crate::ledger::{Dimension, Ledger};

pub const EMPTY_LEDGER: &str = "No entries recorded yet.";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("list", "Show the entries table", "list", cmd_list),
        CommandEntry::new(
            "charts",
            "Show breakdown charts by type, category and payment method",
            "charts [type|category|payment]",
            cmd_charts,
        ),
        CommandEntry::new("balance", "Show the total balance", "balance", cmd_balance),
        CommandEntry::new(
            "dashboard",
            "Show table, charts and balance together",
            "dashboard",
            cmd_dashboard,
        ),
    ]
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let Some(ledger) = context.session.view() else {
        io::print_warning(EMPTY_LEDGER);
        return Ok(());
    };
    print_entries(context, ledger);
    Ok(())
}

fn cmd_charts(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let dimensions = match args.first() {
        Some(raw) => vec![raw.parse::<Dimension>()?],
        None => Dimension::ALL.to_vec(),
    };
    let Some(ledger) = context.session.view() else {
        io::print_warning(EMPTY_LEDGER);
        return Ok(());
    };
    print_charts(context, ledger, &dimensions);
    Ok(())
}

fn cmd_balance(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let Some(ledger) = context.session.view() else {
        io::print_warning(EMPTY_LEDGER);
        return Ok(());
    };
    print_balance(context, ledger);
    Ok(())
}

fn cmd_dashboard(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    render_dashboard(context);
    Ok(())
}

/// Full page: table, the three charts and the balance. Also used after edits.
pub(crate) fn render_dashboard(context: &ShellContext) {
    let Some(ledger) = context.session.view() else {
        io::print_warning(EMPTY_LEDGER);
        return;
    };
    print_entries(context, ledger);
    print_charts(context, ledger, &Dimension::ALL);
    print_balance(context, ledger);
}

pub(crate) fn entries_table(context: &ShellContext, ledger: &Ledger) -> Table {
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("ID"),
        TableColumn::left("Date"),
        TableColumn::left("Type"),
        TableColumn::left("Description").max(32),
        TableColumn::left("Category").max(20),
        TableColumn::left("Payment").max(20),
        TableColumn::right("Amount"),
    ]);
    for (index, entry) in ledger.entries().iter().enumerate() {
        table.push_row(vec![
            index.to_string(),
            entry.id.short(),
            context.format_date(entry.date),
            entry.kind.to_string(),
            entry.description.clone(),
            entry.category.to_string(),
            entry.payment_method.to_string(),
            context.format_amount(entry.amount),
        ]);
    }
    table
}

fn print_entries(context: &ShellContext, ledger: &Ledger) {
    output_section("Entries");
    io::print_info(entries_table(context, ledger).render());
}

fn print_charts(context: &ShellContext, ledger: &Ledger, dimensions: &[Dimension]) {
    let format = context.currency_format();
    let width = chart::bar_width(context.config.chart_width);
    for dimension in dimensions {
        let breakdown = ledger.aggregate(*dimension);
        output_section(dimension.title());
        io::print_info(chart::render_breakdown(&breakdown, &format, width));
    }
}

fn print_balance(context: &ShellContext, ledger: &Ledger) {
    let totals = ledger.totals();
    output_section("Total Balance");
    io::print_info(format!("  {}", context.format_amount(totals.balance())));
    output::separator();
    io::print_info(format!("  Income  : {}", context.format_amount(totals.income)));
    io::print_info(format!("  Expenses: {}", context.format_amount(totals.expense)));
}
