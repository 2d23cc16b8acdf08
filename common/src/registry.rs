//! Registry of supported currencies.

use std::collections::BTreeMap;

use tracing::warn;

use crate::currency::{CurrencyCode, CurrencyDefinition, LookupMode};
use crate::error::{CurrencyError, CurrencyResult};

/// Immutable lookup table from currency code to its definition.
///
/// Built once at startup and shared by reference (usually behind an `Arc`)
/// with the formatter and the conversion service.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    definitions: BTreeMap<CurrencyCode, CurrencyDefinition>,
    default_code: CurrencyCode,
}

impl CurrencyRegistry {
    /// Build a registry from definitions.
    ///
    /// Every definition must validate, codes must be unique and
    /// `default_code` must be one of them.
    pub fn new(
        definitions: impl IntoIterator<Item = CurrencyDefinition>,
        default_code: &str,
    ) -> CurrencyResult<Self> {
        let mut map = BTreeMap::new();

        for mut definition in definitions {
            definition.code = CurrencyCode::parse(definition.code.as_str())?;
            definition.validate()?;

            if map.contains_key(&definition.code) {
                return Err(CurrencyError::InvalidDefinition {
                    code: definition.code.to_string(),
                    reason: "duplicate code".to_string(),
                });
            }
            map.insert(definition.code.clone(), definition);
        }

        let default_code = CurrencyCode::new(default_code);
        if !map.contains_key(&default_code) {
            return Err(CurrencyError::InvalidDefinition {
                code: default_code.to_string(),
                reason: "default currency is not registered".to_string(),
            });
        }

        Ok(Self {
            definitions: map,
            default_code,
        })
    }

    /// Registry of the currencies the fee system ships with, defaulting to BDT.
    pub fn builtin() -> Self {
        let definitions = builtin_definitions();
        let default_code = CurrencyCode::bdt();
        Self {
            definitions: definitions
                .into_iter()
                .map(|d| (d.code.clone(), d))
                .collect(),
            default_code,
        }
    }

    /// Decode a JSON array of definitions.
    pub fn from_json(json: &str, default_code: &str) -> CurrencyResult<Self> {
        let definitions: Vec<CurrencyDefinition> = serde_json::from_str(json)?;
        Self::new(definitions, default_code)
    }

    /// Same definitions with a different default currency.
    pub fn with_default(mut self, code: &str) -> CurrencyResult<Self> {
        let code = CurrencyCode::new(code);
        if !self.definitions.contains_key(&code) {
            return Err(CurrencyError::UnknownCurrencyCode(code.to_string()));
        }
        self.default_code = code;
        Ok(self)
    }

    /// Get the definition for `code`, falling back to the default currency.
    pub fn get(&self, code: &str) -> &CurrencyDefinition {
        match self.definitions.get(&CurrencyCode::new(code)) {
            Some(definition) => definition,
            None => {
                warn!(
                    code = code,
                    fallback = %self.default_code,
                    "Unknown currency code, using default currency"
                );
                self.default_currency()
            }
        }
    }

    /// Get the definition for `code`, failing if it is not registered.
    pub fn lookup(&self, code: &str) -> CurrencyResult<&CurrencyDefinition> {
        self.definitions
            .get(&CurrencyCode::new(code))
            .ok_or_else(|| CurrencyError::UnknownCurrencyCode(code.to_string()))
    }

    /// [`lookup`](Self::lookup) in strict mode, [`get`](Self::get) in lenient mode.
    pub fn resolve(&self, code: &str, mode: LookupMode) -> CurrencyResult<&CurrencyDefinition> {
        match mode {
            LookupMode::Strict => self.lookup(code),
            LookupMode::Lenient => Ok(self.get(code)),
        }
    }

    /// Display symbol for `code`, with the same fallback as [`get`](Self::get).
    pub fn symbol_of(&self, code: &str) -> &str {
        &self.get(code).symbol
    }

    /// Whether `code` is a registered currency.
    pub fn is_valid(&self, code: &str) -> bool {
        self.definitions.contains_key(&CurrencyCode::new(code))
    }

    pub fn default_currency(&self) -> &CurrencyDefinition {
        // Presence of the default is checked on construction.
        &self.definitions[&self.default_code]
    }

    pub fn default_code(&self) -> &CurrencyCode {
        &self.default_code
    }

    /// Registered codes in sorted order.
    pub fn codes(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.definitions.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_definitions() -> Vec<CurrencyDefinition> {
    vec![
        CurrencyDefinition::new("BDT", "৳", "Bangladesh Taka", 2),
        CurrencyDefinition::new("INR", "₹", "Indian Rupee", 2),
        CurrencyDefinition::new("USD", "$", "US Dollar", 2),
        CurrencyDefinition::new("EUR", "€", "Euro", 2),
        CurrencyDefinition::new("GBP", "£", "British Pound", 2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = CurrencyRegistry::builtin();

        assert_eq!(registry.len(), 5);
        assert_eq!(registry.default_code(), &CurrencyCode::bdt());
        assert_eq!(registry.symbol_of("BDT"), "৳");
        assert_eq!(registry.symbol_of("GBP"), "£");
        assert_eq!(registry.get("INR").name, "Indian Rupee");
    }

    #[test]
    fn test_builtin_definitions_validate() {
        let registry = CurrencyRegistry::new(builtin_definitions(), "BDT").unwrap();
        assert_eq!(registry.len(), CurrencyRegistry::builtin().len());
    }

    #[test]
    fn test_unknown_code_falls_back_to_default() {
        let registry = CurrencyRegistry::builtin();

        assert_eq!(registry.get("XYZ").code, CurrencyCode::bdt());
        assert_eq!(registry.symbol_of("XYZ"), "৳");
    }

    #[test]
    fn test_strict_lookup() {
        let registry = CurrencyRegistry::builtin();

        assert!(registry.lookup("USD").is_ok());
        assert_eq!(
            registry.lookup("XYZ"),
            Err(CurrencyError::UnknownCurrencyCode("XYZ".to_string()))
        );
        assert!(registry.resolve("XYZ", LookupMode::Strict).is_err());
        assert_eq!(
            registry.resolve("XYZ", LookupMode::Lenient).unwrap().code,
            CurrencyCode::bdt()
        );
    }

    #[test]
    fn test_is_valid() {
        let registry = CurrencyRegistry::builtin();

        assert!(registry.is_valid("EUR"));
        assert!(registry.is_valid("eur"));
        assert!(!registry.is_valid("XYZ"));
        assert!(!registry.is_valid(""));
    }

    #[test]
    fn test_codes_sorted() {
        let registry = CurrencyRegistry::builtin();
        let codes: Vec<&str> = registry.codes().map(|c| c.as_str()).collect();

        assert_eq!(codes, vec!["BDT", "EUR", "GBP", "INR", "USD"]);
    }

    #[test]
    fn test_new_rejects_missing_default() {
        let result = CurrencyRegistry::new(
            vec![CurrencyDefinition::new("USD", "$", "US Dollar", 2)],
            "BDT",
        );

        assert!(matches!(result, Err(CurrencyError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_new_rejects_duplicates() {
        let result = CurrencyRegistry::new(
            vec![
                CurrencyDefinition::new("USD", "$", "US Dollar", 2),
                CurrencyDefinition::new("usd", "US$", "Dollar", 2),
            ],
            "USD",
        );

        assert!(matches!(result, Err(CurrencyError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_with_default() {
        let registry = CurrencyRegistry::builtin().with_default("usd").unwrap();
        assert_eq!(registry.symbol_of("XYZ"), "$");

        assert!(CurrencyRegistry::builtin().with_default("XYZ").is_err());
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"code": "JPY", "symbol": "¥", "name": "Japanese Yen", "decimal_places": 0,
             "thousands_separator": ",", "decimal_separator": "."},
            {"code": "usd", "symbol": "$", "name": "US Dollar", "decimal_places": 2,
             "thousands_separator": ",", "decimal_separator": "."}
        ]"#;

        let registry = CurrencyRegistry::from_json(json, "USD").unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("JPY").unwrap().decimal_places, 0);
        assert!(registry.is_valid("USD"));
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            CurrencyRegistry::from_json("not json", "BDT"),
            Err(CurrencyError::Json(_))
        ));
    }
}
