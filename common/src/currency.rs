//! Currency codes and definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CurrencyError, CurrencyResult};

/// ISO 4217 style currency code, always upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Create a currency code without validating its shape.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    /// Create a currency code, requiring exactly three ASCII letters.
    pub fn parse(code: &str) -> CurrencyResult<Self> {
        let trimmed = code.trim();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CurrencyError::InvalidCurrencyCode(code.to_string()));
        }
        Ok(Self::new(trimmed))
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bdt() -> Self {
        Self::new("BDT")
    }

    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn gbp() -> Self {
        Self::new("GBP")
    }

    pub fn inr() -> Self {
        Self::new("INR")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Display and formatting configuration for one currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyDefinition {
    pub code: CurrencyCode,
    /// Display glyph, prepended to formatted amounts.
    pub symbol: String,
    pub name: String,
    /// Digits kept after the decimal separator when rounding for display.
    pub decimal_places: u32,
    pub thousands_separator: char,
    pub decimal_separator: char,
}

impl CurrencyDefinition {
    /// Create a definition using `,` and `.` as separators.
    pub fn new(
        code: &str,
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimal_places: u32,
    ) -> Self {
        Self {
            code: CurrencyCode::new(code),
            symbol: symbol.into(),
            name: name.into(),
            decimal_places,
            thousands_separator: ',',
            decimal_separator: '.',
        }
    }

    /// Override the separators.
    pub fn with_separators(mut self, thousands: char, decimal: char) -> Self {
        self.thousands_separator = thousands;
        self.decimal_separator = decimal;
        self
    }

    /// Check the definition is usable for formatting and parsing.
    pub fn validate(&self) -> CurrencyResult<()> {
        CurrencyCode::parse(self.code.as_str())?;

        let invalid = |reason: &str| CurrencyError::InvalidDefinition {
            code: self.code.to_string(),
            reason: reason.to_string(),
        };

        if self.symbol.is_empty() {
            return Err(invalid("symbol cannot be empty"));
        }
        if self.thousands_separator == self.decimal_separator {
            return Err(invalid("separators must differ"));
        }
        if self.decimal_separator.is_ascii_digit() || self.thousands_separator.is_ascii_digit() {
            return Err(invalid("separators cannot be digits"));
        }
        // rust_decimal carries at most 28 fractional digits
        if self.decimal_places > 28 {
            return Err(invalid("decimal places cannot exceed 28"));
        }

        Ok(())
    }
}

/// How lookups treat unknown currency codes and missing rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// Unknown codes and missing rates are errors.
    #[default]
    Strict,
    /// Unknown codes fall back to the default currency, missing rates to 1.
    Lenient,
}

impl LookupMode {
    pub fn is_strict(&self) -> bool {
        matches!(self, LookupMode::Strict)
    }
}

impl fmt::Display for LookupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupMode::Strict => write!(f, "strict"),
            LookupMode::Lenient => write!(f, "lenient"),
        }
    }
}

impl std::str::FromStr for LookupMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(LookupMode::Strict),
            "lenient" | "permissive" => Ok(LookupMode::Lenient),
            other => Err(format!("unknown lookup mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_normalization() {
        assert_eq!(CurrencyCode::new(" usd ").as_str(), "USD");
        assert_eq!(CurrencyCode::from("bdt"), CurrencyCode::bdt());
    }

    #[test]
    fn test_code_parse() {
        assert!(CurrencyCode::parse("EUR").is_ok());
        assert!(matches!(
            CurrencyCode::parse("EURO"),
            Err(CurrencyError::InvalidCurrencyCode(_))
        ));
        assert!(CurrencyCode::parse("U5D").is_err());
        assert!(CurrencyCode::parse("").is_err());
    }

    #[test]
    fn test_definition_validation() {
        let ok = CurrencyDefinition::new("BDT", "৳", "Bangladesh Taka", 2);
        assert!(ok.validate().is_ok());

        let same_separators = ok.clone().with_separators('.', '.');
        assert!(matches!(
            same_separators.validate(),
            Err(CurrencyError::InvalidDefinition { .. })
        ));

        let mut no_symbol = ok;
        no_symbol.symbol.clear();
        assert!(no_symbol.validate().is_err());
    }

    #[test]
    fn test_definition_deserialize() {
        let json = r#"{
            "code": "EUR",
            "symbol": "€",
            "name": "Euro",
            "decimal_places": 2,
            "thousands_separator": ".",
            "decimal_separator": ","
        }"#;

        let def: CurrencyDefinition = serde_json::from_str(json).unwrap();

        assert_eq!(def.code, CurrencyCode::eur());
        assert_eq!(def.thousands_separator, '.');
        assert_eq!(def.decimal_separator, ',');
    }

    #[test]
    fn test_lookup_mode_parse() {
        assert_eq!("Strict".parse::<LookupMode>(), Ok(LookupMode::Strict));
        assert_eq!("lenient".parse::<LookupMode>(), Ok(LookupMode::Lenient));
        assert!("loose".parse::<LookupMode>().is_err());
        assert_eq!(LookupMode::default(), LookupMode::Strict);
    }
}
