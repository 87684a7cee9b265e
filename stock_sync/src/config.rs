//! Engine configuration: TOML-backed with sensible defaults.
//!
//! Every field has a default so the binary runs without a config file; a
//! TOML file overrides selectively. Validation happens at load time so bad
//! operator input fails fast with a pointed message instead of surfacing
//! mid-pass.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// The default tracked universe: large-cap US tickers, matching what the
/// dashboard downstream expects to find populated.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "BRK-B", "UNH", "JPM",
    "V", "XOM", "LLY", "AVGO", "JNJ", "WMT", "MA", "PG", "CVX", "MRK",
    "HD", "COST", "ABBV", "ADBE", "PEP", "BAC", "KO", "PFE", "NFLX", "TMO",
    "DIS", "ABT", "CSCO", "MCD", "CRM", "ACN", "DHR", "LIN", "VZ", "WFC",
    "INTC", "TXN", "NEE", "PM", "BMY", "UNP", "HON", "ORCL", "AMGN", "IBM",
];

fn default_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid literal date")
}

fn default_max_days_back() -> i64 {
    365
}

fn default_interval_hours() -> u64 {
    6
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}

/// Configuration the sync engine runs under.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// SQLite database path. When absent, the binary falls back to the
    /// `DATABASE_URL` environment variable.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Start of the historical window used for bootstrap and forced
    /// refreshes.
    #[serde(default = "default_history_start")]
    pub history_start: NaiveDate,

    /// Upper bound, in days, on how far back an incremental fetch may
    /// reach for a dormant symbol.
    #[serde(default = "default_max_days_back")]
    pub max_days_back: i64,

    /// Hours between passes in continuous mode.
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// Timeout for one source fetch, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Tracked universe for `--all` and continuous mode.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            history_start: default_history_start(),
            max_days_back: default_max_days_back(),
            interval_hours: default_interval_hours(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            symbols: default_symbols(),
        }
    }
}

/// Configuration could not be loaded or is not usable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for [`SyncConfig`].
    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl SyncConfig {
    /// Loads configuration from `path`, or the defaults when `path` is
    /// `None`. The result is validated either way.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                toml::from_str(&raw)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("symbols must not be empty".into()));
        }
        if self.interval_hours == 0 {
            return Err(ConfigError::Invalid(
                "interval_hours must be at least 1".into(),
            ));
        }
        if self.max_days_back < 1 {
            return Err(ConfigError::Invalid(
                "max_days_back must be at least 1".into(),
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
