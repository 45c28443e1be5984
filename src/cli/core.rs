//! Shell context, command dispatch and error reporting.

use std::{
    cell::RefCell,
    collections::VecDeque,
    env, io,
};

use chrono::NaiveDate;
use dialoguer::theme::ColorfulTheme;
use rust_decimal::Decimal;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    cli::{
        commands,
        io as cli_io,
        output::{self, OutputPreferences},
        registry::{CommandEntry, CommandRegistry},
        session::Session,
    },
    config::{Config, ConfigError, ConfigManager},
    currency::{format_currency_value, format_date, CurrencyFormat},
    errors::LedgerError,
    ledger::Ledger,
};

pub const SCRIPT_ENV: &str = "POCKET_LEDGER_CLI_SCRIPT";
pub const SELECTIONS_ENV: &str = "POCKET_LEDGER_TEST_SELECTIONS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

/// Failure of a single command. Always reported and recovered from.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Prompt failed: {0}")]
    Dialoguer(#[from] dialoguer::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Exit requested")]
    ExitRequested,
}

/// Failure that stops the shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Readline error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid input: {0}")]
    Input(String),
}

pub type CommandResult = Result<(), CommandError>;

/// Pre-recorded answers for selection prompts, consumed in order.
#[derive(Debug, Default)]
pub struct SelectionOverride {
    queue: RefCell<VecDeque<Option<Vec<usize>>>>,
}

impl SelectionOverride {
    /// Parses `1|0,2|CANCEL`: groups separated by `|`, indices by `,`.
    pub fn parse(raw: &str) -> Result<Self, CliError> {
        let override_data = Self::default();
        for token in raw.split('|').map(str::trim).filter(|s| !s.is_empty()) {
            let choice = match token.to_ascii_uppercase().as_str() {
                "CANCEL" | "<ESC>" => None,
                "NONE" => Some(Vec::new()),
                value => Some(
                    value
                        .split(',')
                        .map(|part| part.trim().parse::<usize>())
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|_| {
                            CliError::Input(format!("invalid selection token `{value}`"))
                        })?,
                ),
            };
            override_data.push(choice);
        }
        Ok(override_data)
    }

    pub fn push(&self, choice: Option<Vec<usize>>) {
        self.queue.borrow_mut().push_back(choice);
    }

    pub fn pop(&self) -> Option<Option<Vec<usize>>> {
        self.queue.borrow_mut().pop_front()
    }

    pub fn has_choices(&self) -> bool {
        !self.queue.borrow().is_empty()
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub session: Session,
    pub theme: ColorfulTheme,
    pub config: Config,
    pub config_manager: ConfigManager,
    pub selection_override: Option<SelectionOverride>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?)
    }

    pub fn with_config_manager(
        mode: CliMode,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config = config_manager.load()?;
        output::set_preferences(OutputPreferences::from_env());

        let selection_override = match env::var(SELECTIONS_ENV) {
            Ok(raw) => Some(SelectionOverride::parse(&raw)?),
            Err(_) => None,
        };

        tracing::debug!(?mode, path = %config_manager.path().display(), "shell context ready");
        Ok(Self {
            mode,
            registry,
            session: Session::new(),
            theme: ColorfulTheme::default(),
            config,
            config_manager,
            selection_override,
            last_command: None,
            running: true,
        })
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        let count = self.session.ledger().map_or(0, Ledger::len);
        format!("pocket-ledger [{count}]> ")
    }

    pub(crate) fn currency_format(&self) -> CurrencyFormat {
        self.config.currency_format()
    }

    pub(crate) fn format_amount(&self, amount: Decimal) -> String {
        format_currency_value(amount, &self.currency_format())
    }

    pub(crate) fn format_date(&self, date: NaiveDate) -> String {
        format_date(date, &self.config.date_format)
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            tracing::debug!(command, ?args, "dispatching command");
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = crate::cli::shell::parse_command_line(line)
            .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.dispatch(&raw.to_lowercase(), raw, &args)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true)
            .map_err(|err| CliError::Input(err.to_string()))
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            CommandError::Ledger(err @ LedgerError::OutOfRange { .. }) => {
                cli_io::print_error(err);
                cli_io::print_hint("Use `list` to see the current positions.");
            }
            other => cli_io::print_error(other),
        }
    }

    pub(crate) fn can_prompt(&self) -> bool {
        self.mode == CliMode::Interactive
            || self
                .selection_override
                .as_ref()
                .is_some_and(SelectionOverride::has_choices)
    }

    fn scripted_choice(&self) -> Option<Option<Vec<usize>>> {
        self.selection_override
            .as_ref()
            .and_then(SelectionOverride::pop)
    }

    /// One item from `items`; `None` when cancelled.
    pub(crate) fn choose_one(
        &self,
        prompt: &str,
        items: &[String],
    ) -> Result<Option<usize>, CommandError> {
        if let Some(choice) = self.scripted_choice() {
            let Some(picked) = choice else {
                return Ok(None);
            };
            return match picked.first() {
                Some(&index) if index < items.len() => Ok(Some(index)),
                Some(&index) => Err(CommandError::InvalidArguments(format!(
                    "selection {index} is not one of the {} options",
                    items.len()
                ))),
                None => Ok(None),
            };
        }
        if self.mode != CliMode::Interactive {
            return Err(CommandError::InvalidArguments(
                "selection prompts require interactive mode".into(),
            ));
        }
        cli_io::select_one(&self.theme, prompt, items)
    }

    /// Any subset of `items`; `None` when cancelled.
    pub(crate) fn choose_many(
        &self,
        prompt: &str,
        items: &[String],
    ) -> Result<Option<Vec<usize>>, CommandError> {
        if let Some(choice) = self.scripted_choice() {
            let Some(picked) = choice else {
                return Ok(None);
            };
            if let Some(&index) = picked.iter().find(|&&index| index >= items.len()) {
                return Err(CommandError::InvalidArguments(format!(
                    "selection {index} is not one of the {} options",
                    items.len()
                )));
            }
            return Ok(Some(picked));
        }
        if self.mode != CliMode::Interactive {
            return Err(CommandError::InvalidArguments(
                "selection prompts require interactive mode".into(),
            ));
        }
        cli_io::select_many(&self.theme, prompt, items)
    }
}

/// Parses an ISO `YYYY-MM-DD` date.
pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{input}` (expected YYYY-MM-DD)"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn script_context() -> (ShellContext, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut context = ShellContext::with_config_manager(CliMode::Script, manager).unwrap();
        context.selection_override = None;
        context.config.auto_redraw = false;
        (context, dir)
    }

    #[test]
    fn selection_override_parses_groups() {
        let parsed = SelectionOverride::parse("1|0,2|CANCEL|none").unwrap();
        assert_eq!(parsed.pop(), Some(Some(vec![1])));
        assert_eq!(parsed.pop(), Some(Some(vec![0, 2])));
        assert_eq!(parsed.pop(), Some(None));
        assert_eq!(parsed.pop(), Some(Some(Vec::new())));
        assert!(!parsed.has_choices());
        assert!(SelectionOverride::parse("one").is_err());
    }

    #[test]
    fn script_mode_without_override_cannot_prompt() {
        let (context, _dir) = script_context();
        assert!(!context.can_prompt());
        let err = context.choose_one("Pick", &["a".into()]).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
    }

    #[test]
    fn scripted_choices_are_validated() {
        let (mut context, _dir) = script_context();
        let scripted = SelectionOverride::default();
        scripted.push(Some(vec![3]));
        scripted.push(Some(vec![0, 1]));
        context.selection_override = Some(scripted);

        let items = vec!["a".to_string(), "b".to_string()];
        assert!(context.choose_many("Pick", &items).is_err());
        assert_eq!(context.choose_many("Pick", &items).unwrap(), Some(vec![0, 1]));
    }

    #[test]
    fn add_list_delete_flow_updates_session() {
        let (mut context, _dir) = script_context();
        context
            .process_line("add income 1000 food pix Salary")
            .unwrap();
        context
            .process_line("add expense 25.50 food credit Lunch")
            .unwrap();
        context
            .process_line("add expense 4 transport cash Bus")
            .unwrap();
        let ledger = context.session.ledger().unwrap();
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.net_balance(), Decimal::new(97_050, 2));

        context.process_line("delete 1").unwrap();
        let ledger = context.session.ledger().unwrap();
        assert_eq!(ledger.net_balance(), Decimal::new(99_600, 2));
    }

    #[test]
    fn unknown_command_is_not_an_error() {
        let (mut context, _dir) = script_context();
        assert_eq!(context.process_line("lst").unwrap(), LoopControl::Continue);
    }

    #[test]
    fn exit_stops_the_loop() {
        let (mut context, _dir) = script_context();
        assert_eq!(context.process_line("exit").unwrap(), LoopControl::Exit);
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("2025-01-31").is_ok());
        assert!(parse_date("31/01/2025").is_err());
    }
}
