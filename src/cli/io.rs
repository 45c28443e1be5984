use std::fmt;

use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};

use crate::cli::core::CommandError;
use crate::cli::output;

/// Print an informational message via the standard CLI output helpers.
pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

/// Print a warning message via the standard CLI output helpers.
pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

pub fn print_error(message: impl fmt::Display) {
    output::error(message);
}

pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

pub fn print_hint(message: impl fmt::Display) {
    output::hint(message);
}

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(
    theme: &ColorfulTheme,
    prompt: &str,
    default: bool,
) -> Result<bool, CommandError> {
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(CommandError::from)
}

/// Prompt for free-form text. Empty answers are accepted.
pub fn prompt_text(theme: &ColorfulTheme, prompt: &str) -> Result<String, CommandError> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(CommandError::from)
}

/// Prompt for text that must pass `validate` before it is accepted.
pub fn prompt_validated<F>(
    theme: &ColorfulTheme,
    prompt: &str,
    initial: &str,
    validate: F,
) -> Result<String, CommandError>
where
    F: FnMut(&String) -> Result<(), String>,
{
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .with_initial_text(initial)
        .validate_with(validate)
        .interact_text()
        .map_err(CommandError::from)
}

/// Single choice from `items`. `None` when the user presses ESC.
pub fn select_one(
    theme: &ColorfulTheme,
    prompt: &str,
    items: &[String],
) -> Result<Option<usize>, CommandError> {
    Select::with_theme(theme)
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact_opt()
        .map_err(CommandError::from)
}

/// Any number of choices from `items`. `None` when the user presses ESC.
pub fn select_many(
    theme: &ColorfulTheme,
    prompt: &str,
    items: &[String],
) -> Result<Option<Vec<usize>>, CommandError> {
    MultiSelect::with_theme(theme)
        .with_prompt(prompt)
        .items(items)
        .interact_opt()
        .map_err(CommandError::from)
}
