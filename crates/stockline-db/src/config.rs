//! # Application Configuration
//!
//! Store-level settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`STOCKLINE_*`)
//! 2. Defaults (this file)
//!
//! ## Environment Variables
//! ```text
//! STOCKLINE_DB_PATH           database file (default: platform data dir)
//! STOCKLINE_STORE_NAME        shown on receipts and reports
//! STOCKLINE_CURRENCY_SYMBOL   prefix for formatted amounts
//! STOCKLINE_MAX_CONNECTIONS   pool size, positive integer
//! ```
//!
//! Configuration is read-only after initialization, so no lock.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pool::DbConfig;

/// Database file name inside the data directory.
pub const DATABASE_FILE_NAME: &str = "stockline.db";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("Could not determine the application data directory")]
    NoDataDir,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub database_path: PathBuf,

    /// Store name (displayed on receipts)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    pub max_connections: u32,
}

impl Default for AppConfig {
    /// Development defaults: `./stockline.db`, "$", two decimals.
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from(DATABASE_FILE_NAME),
            store_name: "Stockline Store".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            max_connections: 5,
        }
    }
}

impl AppConfig {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        config.database_path = match lookup("STOCKLINE_DB_PATH") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_database_path()?,
        };

        if let Some(store_name) = lookup("STOCKLINE_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(symbol) = lookup("STOCKLINE_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(value) = lookup("STOCKLINE_MAX_CONNECTIONS") {
            config.max_connections = match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "STOCKLINE_MAX_CONNECTIONS",
                        value,
                    })
                }
            };
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust
    /// use stockline_db::AppConfig;
    ///
    /// let config = AppConfig::default();
    /// assert_eq!(config.format_currency(1234), "$12.34");
    /// assert_eq!(config.format_currency(-5), "-$0.05");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = (cents / divisor).abs();
        let frac = (cents % divisor).abs();
        let sign = if cents < 0 { "-" } else { "" };

        if self.currency_decimals > 0 {
            format!(
                "{}{}{}.{:0width$}",
                sign,
                self.currency_symbol,
                whole,
                frac,
                width = self.currency_decimals as usize
            )
        } else {
            format!("{}{}{}", sign, self.currency_symbol, whole)
        }
    }
}

/// Platform data directory path for the database file.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.stockline.pos/stockline.db`
/// - **Windows**: `%APPDATA%\stockline\pos\data\stockline.db`
/// - **Linux**: `~/.local/share/pos/stockline.db`
pub fn default_database_path() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("com", "stockline", "pos").ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join(DATABASE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_format_currency() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(1234), "$12.34");
        assert_eq!(config.format_currency(100), "$1.00");
        assert_eq!(config.format_currency(0), "$0.00");
        assert_eq!(config.format_currency(-1234), "-$12.34");
    }

    #[test]
    fn test_format_currency_custom_symbol() {
        let config = AppConfig {
            currency_symbol: "Rs ".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.format_currency(250_075), "Rs 2500.75");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("STOCKLINE_DB_PATH", "/tmp/shop.db"),
            ("STOCKLINE_STORE_NAME", "Corner Shop"),
            ("STOCKLINE_CURRENCY_SYMBOL", "€"),
            ("STOCKLINE_MAX_CONNECTIONS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.store_name, "Corner Shop");
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.db_config().max_connections, 3);
    }

    #[test]
    fn test_invalid_max_connections() {
        for bad in ["zero", "0", "-2"] {
            let err = AppConfig::from_lookup(lookup(&[
                ("STOCKLINE_DB_PATH", "/tmp/shop.db"),
                ("STOCKLINE_MAX_CONNECTIONS", bad),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidNumber { .. }));
        }
    }
}
