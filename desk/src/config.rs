//! Desk configuration.

use std::path::PathBuf;
use std::time::Duration;

use feedesk_common::{CurrencyCode, CurrencyConfig, LookupMode};

/// Simulated payment gateway configuration.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Probability in `[0, 1]` that a payment succeeds.
    pub success_rate: f64,
    /// Simulated processing time.
    pub processing_delay: Duration,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            success_rate: 0.9,
            processing_delay: Duration::from_secs(3),
        }
    }
}

/// Main desk configuration.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// Currency lookup configuration.
    pub currency: CurrencyConfig,
    /// JSON file with currency definitions; built-in registry when unset.
    pub currencies_file: Option<PathBuf>,
    /// JSON file with exchange rates; built-in table when unset.
    pub rates_file: Option<PathBuf>,
    /// Rate refresh interval.
    pub refresh_interval: Duration,
    /// Payment gateway configuration.
    pub payment: PaymentConfig,
    /// Emit JSON logs.
    pub log_json: bool,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            currency: CurrencyConfig::default(),
            currencies_file: None,
            rates_file: None,
            refresh_interval: Duration::from_secs(300),
            payment: PaymentConfig::default(),
            log_json: false,
        }
    }
}

impl DeskConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key lookup, ignoring unparseable values.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(code) = get("FEEDESK_DEFAULT_CURRENCY") {
            config.currency.default_currency = CurrencyCode::new(code);
        }

        if let Some(mode) = get("FEEDESK_LOOKUP_MODE") {
            if let Ok(mode) = mode.parse::<LookupMode>() {
                config.currency.mode = mode;
            }
        }

        if let Some(path) = get("FEEDESK_CURRENCIES_FILE") {
            config.currencies_file = Some(PathBuf::from(path));
        }

        if let Some(path) = get("FEEDESK_RATES_FILE") {
            config.rates_file = Some(PathBuf::from(path));
        }

        if let Some(secs) = get("FEEDESK_REFRESH_SECS") {
            if let Ok(secs) = secs.parse() {
                config.refresh_interval = Duration::from_secs(secs);
            }
        }

        if let Some(rate) = get("FEEDESK_PAYMENT_SUCCESS_RATE") {
            if let Ok(rate) = rate.parse() {
                config.payment.success_rate = rate;
            }
        }

        if let Some(ms) = get("FEEDESK_PAYMENT_DELAY_MS") {
            if let Ok(ms) = ms.parse() {
                config.payment.processing_delay = Duration::from_millis(ms);
            }
        }

        if let Some(flag) = get("FEEDESK_LOG_JSON") {
            config.log_json = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.currency.default_currency.as_str().is_empty() {
            return Err("Default currency cannot be empty".to_string());
        }

        if self.refresh_interval.is_zero() {
            return Err("Refresh interval cannot be 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.payment.success_rate) {
            return Err(format!(
                "Payment success rate {} must be between 0 and 1",
                self.payment.success_rate
            ));
        }

        Ok(())
    }
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
    fn test_default_config() {
        let config = DeskConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.currency.mode, LookupMode::Strict);
    }

    #[test]
    fn test_from_lookup() {
        let config = DeskConfig::from_lookup(lookup(&[
            ("FEEDESK_DEFAULT_CURRENCY", "usd"),
            ("FEEDESK_LOOKUP_MODE", "lenient"),
            ("FEEDESK_RATES_FILE", "/etc/feedesk/rates.json"),
            ("FEEDESK_REFRESH_SECS", "60"),
            ("FEEDESK_PAYMENT_SUCCESS_RATE", "0.5"),
            ("FEEDESK_PAYMENT_DELAY_MS", "0"),
            ("FEEDESK_LOG_JSON", "true"),
        ]));

        assert_eq!(config.currency.default_currency, CurrencyCode::usd());
        assert_eq!(config.currency.mode, LookupMode::Lenient);
        assert_eq!(
            config.rates_file.as_deref(),
            Some(std::path::Path::new("/etc/feedesk/rates.json"))
        );
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.payment.success_rate, 0.5);
        assert!(config.payment.processing_delay.is_zero());
        assert!(config.log_json);
    }

    #[test]
    fn test_bad_values_ignored() {
        let config = DeskConfig::from_lookup(lookup(&[
            ("FEEDESK_LOOKUP_MODE", "sloppy"),
            ("FEEDESK_REFRESH_SECS", "soon"),
        ]));

        assert_eq!(config.currency.mode, LookupMode::Strict);
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = DeskConfig::default();
        config.payment.success_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = DeskConfig::default();
        config.refresh_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
