pub mod commands;
pub mod core;
pub mod forms;
pub mod help;
pub mod io;
pub mod output;
pub mod registry;
pub mod session;
mod shell;
pub mod ui;

pub use self::core::{CliError, CliMode, CommandError, ShellContext};
pub use shell::run_cli;
