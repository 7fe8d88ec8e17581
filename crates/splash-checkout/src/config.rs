//! # Checkout Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SPLASH_STORE_NAME, SPLASH_SUBMIT_TIMEOUT_SECS, ...                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $SPLASH_CONFIG, or                                                 │
//! │     ~/.config/splash-pos/checkout.toml (Linux)                         │
//! │     ~/Library/Application Support/com.splash.pos/checkout.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! store_name = "Splash Park — Main Gate"
//! store_address = ["Beach Road 1", "Aqaba"]
//! currency_symbol = "JD "
//! submit_timeout_secs = 15
//! receipt_copies = 2
//! ```
//!
//! Read-only after startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use splash_core::Money;
use tracing::{debug, info};

use crate::error::ConfigError;

/// Checkout configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// Printed on receipts.
    pub store_name: String,

    /// Receipt header lines.
    pub store_address: Vec<String>,

    /// Prefix for displayed amounts.
    pub currency_symbol: String,

    /// Upper bound on one order submission.
    pub submit_timeout_secs: u64,

    /// Receipt copies per order: first is the customer's, the rest merchant.
    pub receipt_copies: u8,

    /// Description sent when the cashier leaves it blank.
    pub default_description: String,
}

impl Default for CheckoutConfig {
    /// Development defaults: 15 s submit timeout, customer + merchant copy.
    fn default() -> Self {
        CheckoutConfig {
            store_name: "Splash Water Park".to_string(),
            store_address: Vec::new(),
            currency_symbol: String::new(),
            submit_timeout_secs: 15,
            receipt_copies: 2,
            default_description: String::new(),
        }
    }
}

impl CheckoutConfig {
    /// Loads defaults, then the config file (if any), then the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "No config file, using defaults");
                CheckoutConfig::default()
            }
            None => CheckoutConfig::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        info!(
            store = %config.store_name,
            submit_timeout_secs = config.submit_timeout_secs,
            receipt_copies = config.receipt_copies,
            "Checkout configuration loaded"
        );
        Ok(config)
    }

    /// `$SPLASH_CONFIG`, else the platform config dir.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SPLASH_CONFIG") {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("com", "splash", "pos").map(|dirs| dirs.config_dir().join("checkout.toml"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses a (possibly partial) TOML document over the defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies `SPLASH_*` overrides from a key lookup.
    ///
    /// ## Environment Variables
    /// - `SPLASH_STORE_NAME`
    /// - `SPLASH_CURRENCY_SYMBOL`
    /// - `SPLASH_SUBMIT_TIMEOUT_SECS` (integer, > 0)
    /// - `SPLASH_RECEIPT_COPIES` (integer)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("SPLASH_STORE_NAME") {
            self.store_name = name;
        }
        if let Some(symbol) = lookup("SPLASH_CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }
        if let Some(secs) = lookup("SPLASH_SUBMIT_TIMEOUT_SECS") {
            self.submit_timeout_secs = secs
                .trim()
                .parse()
                .ok()
                .filter(|&s: &u64| s > 0)
                .ok_or_else(|| ConfigError::InvalidValue("SPLASH_SUBMIT_TIMEOUT_SECS".to_string()))?;
        }
        if let Some(copies) = lookup("SPLASH_RECEIPT_COPIES") {
            self.receipt_copies = copies
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SPLASH_RECEIPT_COPIES".to_string()))?;
        }
        Ok(())
    }

    /// Submission timeout as a `Duration`. Never zero.
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs.max(1))
    }

    /// Formats an amount for display: symbol + two decimals.
    ///
    /// ## Example
    /// ```rust
    /// use splash_checkout::config::CheckoutConfig;
    /// use splash_core::Money;
    ///
    /// let config = CheckoutConfig { currency_symbol: "JD ".into(), ..Default::default() };
    /// assert_eq!(config.format_currency(Money::from_cents(15000)), "JD 150.00");
    /// assert_eq!(config.format_currency(Money::from_cents(-550)), "-JD 5.50");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        format!("{}{}{}", sign, self.currency_symbol, amount.abs())
    }
}
