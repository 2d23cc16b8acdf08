//! Currency configuration shared by the formatter and the conversion service.

use serde::{Deserialize, Serialize};

use crate::currency::{CurrencyCode, LookupMode};
use crate::registry::CurrencyRegistry;

/// Configuration for currency lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency used as fallback for unknown codes in lenient mode.
    pub default_currency: CurrencyCode,
    /// How unknown codes and missing rates are handled.
    pub mode: LookupMode,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            default_currency: CurrencyCode::bdt(),
            mode: LookupMode::Strict,
        }
    }
}

impl CurrencyConfig {
    /// Validate configuration against the registry it will be used with.
    pub fn validate(&self, registry: &CurrencyRegistry) -> Result<(), String> {
        if self.default_currency.as_str().is_empty() {
            return Err("Default currency cannot be empty".to_string());
        }

        if !registry.is_valid(self.default_currency.as_str()) {
            return Err(format!(
                "Default currency {} is not registered",
                self.default_currency
            ));
        }

        Ok(())
    }
}
