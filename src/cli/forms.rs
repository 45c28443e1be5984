//! Entry form: collects the fields of a new entry either from command
//! arguments or from a sequence of interactive prompts.

use rust_decimal::Decimal;

use crate::cli::core::{parse_date, CommandError, ShellContext};
use crate::cli::io;
use crate::config::Config;
use crate::currency::{parse_amount, CurrencyFormat};
use crate::ledger::{Category, Entry, EntryKind, PaymentMethod};

pub const ADD_USAGE: &str =
    "add <income|expense> <amount> <category> <payment> [description...] [--date YYYY-MM-DD]";

const CUSTOM_OPTION: &str = "Custom…";
const MAX_DECIMALS: u32 = 2;

/// Outcome of the interactive form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormResult<T> {
    Completed(T),
    Cancelled,
}

/// Parses and checks an amount typed by the user.
pub fn parse_entry_amount(input: &str, format: &CurrencyFormat) -> Result<Decimal, CommandError> {
    let amount = parse_amount(input, format)?;
    if amount < Decimal::ZERO {
        return Err(CommandError::InvalidArguments(
            "amount must be zero or positive".into(),
        ));
    }
    if amount.normalize().scale() > MAX_DECIMALS {
        return Err(CommandError::InvalidArguments(format!(
            "amount `{}` has more than {MAX_DECIMALS} decimal places",
            input.trim()
        )));
    }
    Ok(amount)
}

pub fn resolve_category(input: &str, config: &Config) -> Result<Category, CommandError> {
    if let Some(category) = Category::standard(input) {
        return Ok(category);
    }
    if config.allow_custom_categories {
        return Ok(Category::custom(input)?);
    }
    Err(CommandError::InvalidArguments(format!(
        "unknown category `{input}` (see `categories`)"
    )))
}

pub fn resolve_payment_method(input: &str, config: &Config) -> Result<PaymentMethod, CommandError> {
    if let Some(method) = PaymentMethod::standard(input) {
        return Ok(method);
    }
    if config.allow_custom_payment_methods {
        return Ok(PaymentMethod::custom(input)?);
    }
    Err(CommandError::InvalidArguments(format!(
        "unknown payment method `{input}` (see `payments`)"
    )))
}

/// Builds an entry from `add` arguments.
pub fn entry_from_args(args: &[&str], config: &Config) -> Result<Entry, CommandError> {
    let mut positional = Vec::with_capacity(args.len());
    let mut date = None;
    let mut iter = args.iter();
    while let Some(&arg) = iter.next() {
        if arg == "--date" {
            let value = iter.next().ok_or_else(|| {
                CommandError::InvalidArguments("`--date` requires a value".into())
            })?;
            date = Some(parse_date(value)?);
        } else if let Some(value) = arg.strip_prefix("--date=") {
            date = Some(parse_date(value)?);
        } else {
            positional.push(arg);
        }
    }

    let [kind, amount, category, payment, description @ ..] = positional.as_slice() else {
        return Err(CommandError::InvalidArguments(format!("usage: {ADD_USAGE}")));
    };

    let kind: EntryKind = kind.parse()?;
    let amount = parse_entry_amount(amount, &config.currency_format())?;
    let category = resolve_category(category, config)?;
    let payment_method = resolve_payment_method(payment, config)?;
    let description = description.join(" ");

    let entry = Entry::new(kind, description.trim(), category, payment_method, amount);
    Ok(match date {
        Some(date) => entry.with_date(date),
        None => entry,
    })
}

/// Walks the user through kind, description, amount, category and payment.
pub fn run_entry_form(context: &ShellContext) -> Result<FormResult<Entry>, CommandError> {
    let kinds: Vec<String> = EntryKind::ALL.iter().map(|kind| kind.to_string()).collect();
    let Some(kind) = context.choose_one("Type", &kinds)? else {
        return Ok(FormResult::Cancelled);
    };
    let kind = EntryKind::ALL[kind];

    let description = io::prompt_text(&context.theme, "Description")?;

    let format = context.currency_format();
    let amount = io::prompt_validated(&context.theme, "Amount", "0.00", |input: &String| {
        parse_entry_amount(input, &format)
            .map(|_| ())
            .map_err(|err| err.to_string())
    })?;
    let amount = parse_entry_amount(&amount, &format)?;

    let Some(category) = pick_category(context)? else {
        return Ok(FormResult::Cancelled);
    };
    let Some(payment_method) = pick_payment_method(context)? else {
        return Ok(FormResult::Cancelled);
    };

    Ok(FormResult::Completed(Entry::new(
        kind,
        description.trim(),
        category,
        payment_method,
        amount,
    )))
}

fn pick_category(context: &ShellContext) -> Result<Option<Category>, CommandError> {
    let mut options: Vec<String> = Category::STANDARD
        .iter()
        .map(|category| category.to_string())
        .collect();
    if context.config.allow_custom_categories {
        options.push(CUSTOM_OPTION.into());
    }
    let Some(choice) = context.choose_one("Category", &options)? else {
        return Ok(None);
    };
    match Category::STANDARD.get(choice) {
        Some(category) => Ok(Some(category.clone())),
        None => {
            let name = io::prompt_text(&context.theme, "Category name")?;
            Ok(Some(Category::custom(&name)?))
        }
    }
}

fn pick_payment_method(context: &ShellContext) -> Result<Option<PaymentMethod>, CommandError> {
    let mut options: Vec<String> = PaymentMethod::STANDARD
        .iter()
        .map(|method| method.to_string())
        .collect();
    if context.config.allow_custom_payment_methods {
        options.push(CUSTOM_OPTION.into());
    }
    let Some(choice) = context.choose_one("Payment method", &options)? else {
        return Ok(None);
    };
    match PaymentMethod::STANDARD.get(choice) {
        Some(method) => Ok(Some(method.clone())),
        None => {
            let name = io::prompt_text(&context.theme, "Payment method name")?;
            Ok(Some(PaymentMethod::custom(&name)?))
        }
    }
}
