use assert_cmd::Command;
use tempfile::TempDir;

/// Script-mode CLI command isolated in its own configuration directory.
pub fn script_command(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pocket_ledger_cli").unwrap();
    cmd.env("POCKET_LEDGER_CLI_SCRIPT", "1")
        .env("POCKET_LEDGER_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("POCKET_LEDGER_TEST_SELECTIONS")
        .env_remove("RUST_LOG");
    cmd
}

/// Commands that record the salary, lunch and bus sample entries.
pub const SAMPLE_ENTRIES: &str = "\
add income 1000.00 other pix Salary
add expense 25.50 food credit Lunch
add expense 4.00 transport cash Bus
";
