//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`CANTEEN_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use canteen_core::{TaxRate, DEFAULT_PREP_WINDOW_MINUTES, DEFAULT_TAX_RATE};

/// Longest accepted prep window: one day.
const MAX_PREP_WINDOW_MINUTES: i64 = 24 * 60;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Shown in the header and on bills.
    pub canteen_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Tax rate in basis points, applied to every bill.
    /// e.g., 500 = 5%
    pub tax_rate_bps: u32,

    /// Minutes added to the order time for the estimated pickup.
    pub prep_window_minutes: i64,

    /// How often the order screens refresh.
    pub order_poll_interval_secs: u64,

    /// SQLite file. `None` runs on a private in-memory database.
    pub database_path: Option<PathBuf>,

    /// Where client-local state (the cart slot) lives.
    /// `None` uses the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Canteen: "Campus Canteen"
    /// - Currency: INR (₹)
    /// - Tax: 5%
    /// - Prep window: 15 minutes
    /// - Database: in-memory
    fn default() -> Self {
        ConfigState {
            canteen_name: "Campus Canteen".to_string(),
            currency_code: "INR".to_string(),
            currency_symbol: "₹".to_string(),
            currency_decimals: 2,
            tax_rate_bps: DEFAULT_TAX_RATE.bps(),
            prep_window_minutes: DEFAULT_PREP_WINDOW_MINUTES,
            order_poll_interval_secs: 5,
            database_path: None,
            data_dir: None,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `CANTEEN_NAME`: Override canteen name
    /// - `CANTEEN_TAX_RATE`: Tax rate in percent (e.g., "5" or "12.5")
    /// - `CANTEEN_PREP_MINUTES`: Prep window in whole minutes (1 to 1440)
    /// - `CANTEEN_DB_PATH`: SQLite file to open instead of in-memory
    /// - `CANTEEN_DATA_DIR`: Directory for the cart slot
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    ///
    /// Unparseable values are logged and the default kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = ConfigState::default();

        if let Some(name) = lookup("CANTEEN_NAME") {
            config.canteen_name = name;
        }

        if let Some(raw) = lookup("CANTEEN_TAX_RATE") {
            match raw.trim().parse::<f64>() {
                Ok(pct) if (0.0..=100.0).contains(&pct) => {
                    config.tax_rate_bps = TaxRate::from_percentage(pct).bps();
                }
                _ => warn!(value = %raw, "Ignoring invalid CANTEEN_TAX_RATE"),
            }
        }

        if let Some(raw) = lookup("CANTEEN_PREP_MINUTES") {
            match raw.trim().parse::<i64>() {
                Ok(minutes) if (1..=MAX_PREP_WINDOW_MINUTES).contains(&minutes) => {
                    config.prep_window_minutes = minutes;
                }
                _ => warn!(value = %raw, "Ignoring invalid CANTEEN_PREP_MINUTES"),
            }
        }

        if let Some(path) = lookup("CANTEEN_DB_PATH").filter(|p| !p.is_empty()) {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Some(dir) = lookup("CANTEEN_DATA_DIR").filter(|d| !d.is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        config
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Always at least one minute, so a ready time lies after its order.
    pub fn prep_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.prep_window_minutes.clamp(1, MAX_PREP_WINDOW_MINUTES))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.order_poll_interval_secs.max(1))
    }

    /// Formats a paise amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(23100), "₹231.00");
    /// ```
    pub fn format_currency(&self, paise: i64) -> String {
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = paise / divisor;
        let frac = (paise % divisor).abs();

        format!(
            "{}{}{}",
            if paise < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> ConfigState {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ConfigState::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_with(&[]);
        assert_eq!(config.tax_rate_bps, 500);
        assert_eq!(config.prep_window(), chrono::Duration::minutes(15));
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_with(&[
            ("CANTEEN_NAME", "North Block Mess"),
            ("CANTEEN_TAX_RATE", "12.5"),
            ("CANTEEN_PREP_MINUTES", "20"),
            ("CANTEEN_DB_PATH", "/tmp/canteen.db"),
        ]);
        assert_eq!(config.canteen_name, "North Block Mess");
        assert_eq!(config.tax_rate_bps, 1250);
        assert_eq!(config.prep_window_minutes, 20);
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/canteen.db")));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = config_with(&[
            ("CANTEEN_TAX_RATE", "lots"),
            ("CANTEEN_PREP_MINUTES", "-3"),
        ]);
        assert_eq!(config.tax_rate_bps, 500);
        assert_eq!(config.prep_window_minutes, 15);

        for minutes in ["0", "1441", "9223372036854775807"] {
            let config = config_with(&[("CANTEEN_PREP_MINUTES", minutes)]);
            assert_eq!(config.prep_window_minutes, 15, "accepted {}", minutes);
        }
    }

    #[test]
    fn test_prep_window_is_never_empty() {
        let config = ConfigState {
            prep_window_minutes: 0,
            ..ConfigState::default()
        };
        assert_eq!(config.prep_window(), chrono::Duration::minutes(1));
    }

    #[test]
    fn test_format_currency() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(23100), "₹231.00");
        assert_eq!(config.format_currency(1), "₹0.01");
        assert_eq!(config.format_currency(-1550), "-₹15.50");
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(ConfigState::default()).unwrap();
        assert_eq!(json["taxRateBps"], 500);
        assert_eq!(json["currencyCode"], "INR");
    }
}
