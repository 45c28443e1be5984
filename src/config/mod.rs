//! User preferences and their on-disk persistence.
//!
//! Only display preferences are stored here. Ledger entries never leave memory.

use std::{
    env,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::format::{Item, StrftimeItems};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::currency::CurrencyFormat;

const DEFAULT_DIR_NAME: &str = ".pocket_ledger";
const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";
pub const HOME_ENV: &str = "POCKET_LEDGER_HOME";
pub const MIN_CHART_WIDTH: u16 = 10;
pub const MAX_CHART_WIDTH: u16 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("unknown config key `{0}`")]
    UnknownKey(String),
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency_symbol: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub date_format: String,
    pub allow_custom_categories: bool,
    pub allow_custom_payment_methods: bool,
    /// Redraw table, charts and balance after every change.
    pub auto_redraw: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_width: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        let currency = CurrencyFormat::default();
        Self {
            currency_symbol: currency.symbol,
            decimal_separator: currency.decimal_separator,
            grouping_separator: currency.grouping_separator,
            date_format: "%Y-%m-%d".into(),
            allow_custom_categories: false,
            allow_custom_payment_methods: false,
            auto_redraw: true,
            chart_width: None,
        }
    }
}

impl Config {
    pub const KEYS: [&'static str; 8] = [
        "currency_symbol",
        "decimal_separator",
        "grouping_separator",
        "date_format",
        "allow_custom_categories",
        "allow_custom_payment_methods",
        "auto_redraw",
        "chart_width",
    ];

    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat {
            symbol: self.currency_symbol.clone(),
            decimal_separator: self.decimal_separator,
            grouping_separator: self.grouping_separator,
        }
    }

    /// Current value of `key` rendered as text.
    pub fn value_of(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "currency_symbol" => self.currency_symbol.clone(),
            "decimal_separator" => self.decimal_separator.to_string(),
            "grouping_separator" => self.grouping_separator.to_string(),
            "date_format" => self.date_format.clone(),
            "allow_custom_categories" => on_off(self.allow_custom_categories),
            "allow_custom_payment_methods" => on_off(self.allow_custom_payment_methods),
            "auto_redraw" => on_off(self.auto_redraw),
            "chart_width" => self
                .chart_width
                .map(|width| width.to_string())
                .unwrap_or_else(|| "auto".into()),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Updates `key` from its textual form.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = key.trim().to_ascii_lowercase();
        let mut next = self.clone();
        match key.as_str() {
            "currency_symbol" => next.currency_symbol = value.trim().to_string(),
            "decimal_separator" => next.decimal_separator = single_char(&key, value)?,
            "grouping_separator" => next.grouping_separator = single_char(&key, value)?,
            "date_format" => {
                let pattern = value.trim();
                if pattern.is_empty() {
                    return Err(invalid(&key, "date format cannot be empty"));
                }
                if !is_valid_date_format(pattern) {
                    return Err(invalid(&key, "not a valid strftime pattern"));
                }
                next.date_format = pattern.to_string();
            }
            "allow_custom_categories" => next.allow_custom_categories = parse_flag(&key, value)?,
            "allow_custom_payment_methods" => {
                next.allow_custom_payment_methods = parse_flag(&key, value)?
            }
            "auto_redraw" => next.auto_redraw = parse_flag(&key, value)?,
            "chart_width" => {
                if value.eq_ignore_ascii_case("auto") || value.trim().is_empty() {
                    next.chart_width = None;
                } else {
                    let width: u16 = value
                        .trim()
                        .parse()
                        .map_err(|_| invalid(&key, "must be a number or `auto`"))?;
                    if !(MIN_CHART_WIDTH..=MAX_CHART_WIDTH).contains(&width) {
                        return Err(invalid(
                            &key,
                            &format!("must be between {MIN_CHART_WIDTH} and {MAX_CHART_WIDTH}"),
                        ));
                    }
                    next.chart_width = Some(width);
                }
            }
            _ => return Err(ConfigError::UnknownKey(key)),
        }
        if next.decimal_separator == next.grouping_separator {
            return Err(invalid(
                &key,
                "decimal and grouping separators must differ",
            ));
        }
        *self = next;
        Ok(())
    }
}

/// True when every item of `pattern` is a known strftime specifier.
pub fn is_valid_date_format(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

fn on_off(flag: bool) -> String {
    let label = if flag { "on" } else { "off" };
    label.to_string()
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn single_char(key: &str, value: &str) -> Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if !ch.is_ascii_digit() => Ok(ch),
        _ => Err(invalid(key, "must be a single non-digit character")),
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(invalid(key, "expected on/off")),
    }
}

/// Returns the application data directory, defaulting to `~/.pocket_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Handles persistence for [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join(CONFIG_DIR);
        fs::create_dir_all(&config_dir)?;
        Ok(Self {
            path: config_dir.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let mut config: Config =
                serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?;
            if config.date_format.trim().is_empty() || !is_valid_date_format(&config.date_format) {
                tracing::warn!(pattern = %config.date_format, "stored date format is invalid; using default");
                config.date_format = Config::default().date_format;
            }
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
