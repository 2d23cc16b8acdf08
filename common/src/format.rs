//! Rendering and parsing of amounts in a currency's display conventions.
//!
//! Amounts are rounded half away from zero to the currency's decimal places,
//! the integer part is grouped by three and the symbol is prepended without
//! a space. Negative amounts carry the sign before the symbol: `-৳1,234.50`.

use std::sync::Arc;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::currency::{CurrencyDefinition, LookupMode};
use crate::error::{CurrencyError, CurrencyResult};
use crate::monetary::amount_from_f64;
use crate::registry::CurrencyRegistry;

/// Formats and parses amounts using a [`CurrencyRegistry`].
#[derive(Debug, Clone)]
pub struct CurrencyFormatter {
    registry: Arc<CurrencyRegistry>,
    mode: LookupMode,
}

impl CurrencyFormatter {
    pub fn new(registry: Arc<CurrencyRegistry>, mode: LookupMode) -> Self {
        Self { registry, mode }
    }

    /// Formatter that rejects unknown currency codes.
    pub fn strict(registry: Arc<CurrencyRegistry>) -> Self {
        Self::new(registry, LookupMode::Strict)
    }

    /// Formatter that renders unknown currency codes as the default currency.
    pub fn lenient(registry: Arc<CurrencyRegistry>) -> Self {
        Self::new(registry, LookupMode::Lenient)
    }

    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    pub fn registry(&self) -> &CurrencyRegistry {
        &self.registry
    }

    /// Render `amount` for display in `code`.
    pub fn format(&self, amount: Decimal, code: &str) -> CurrencyResult<String> {
        let definition = self.registry.resolve(code, self.mode)?;
        Ok(render(amount, definition))
    }

    /// Render a floating point amount, rejecting NaN and infinities.
    pub fn format_f64(&self, amount: f64, code: &str) -> CurrencyResult<String> {
        let amount = amount_from_f64(amount)?;
        self.format(amount, code)
    }

    /// Round `amount` to the display precision of `code`.
    pub fn round(&self, amount: Decimal, code: &str) -> CurrencyResult<Decimal> {
        let definition = self.registry.resolve(code, self.mode)?;
        Ok(round_to(amount, definition.decimal_places))
    }

    /// Parse a formatted amount, returning zero when the text is not a number.
    ///
    /// Only an unknown currency code in strict mode is an error.
    pub fn parse(&self, text: &str, code: &str) -> CurrencyResult<Decimal> {
        match self.try_parse(text, code) {
            Ok(value) => Ok(value),
            Err(CurrencyError::UnparseableAmount(_)) => {
                debug!(text = text, code = code, "Unparseable amount, using zero");
                Ok(Decimal::ZERO)
            }
            Err(e) => Err(e),
        }
    }

    /// Parse a formatted amount, failing with `UnparseableAmount` on bad input.
    pub fn try_parse(&self, text: &str, code: &str) -> CurrencyResult<Decimal> {
        let definition = self.registry.resolve(code, self.mode)?;
        let cleaned = clean(text, definition);

        cleaned
            .parse::<Decimal>()
            .map_err(|_| CurrencyError::UnparseableAmount(text.to_string()))
    }
}

fn round_to(amount: Decimal, decimal_places: u32) -> Decimal {
    amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

fn render(amount: Decimal, definition: &CurrencyDefinition) -> String {
    let mut rounded = round_to(amount, definition.decimal_places);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded.set_sign_positive(true);

    // Pad the fraction as text; rescale caps the scale for very large values.
    let digits = rounded.to_string();
    let (integer, fraction) = match digits.split_once('.') {
        Some((integer, fraction)) => (integer, fraction),
        None => (digits.as_str(), ""),
    };
    let places = definition.decimal_places as usize;
    let fraction = format!("{fraction:0<places$}");

    let mut out = String::with_capacity(digits.len() + definition.symbol.len() + 8);
    if negative {
        out.push('-');
    }
    out.push_str(&definition.symbol);
    out.push_str(&group_digits(integer, definition.thousands_separator));
    if !fraction.is_empty() {
        out.push(definition.decimal_separator);
        out.push_str(&fraction);
    }
    out
}

fn group_digits(integer: &str, separator: char) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(digit);
    }
    out
}

fn clean(text: &str, definition: &CurrencyDefinition) -> String {
    text.replace(definition.symbol.as_str(), "")
        .chars()
        .filter(|c| *c != definition.thousands_separator)
        .map(|c| {
            if c == definition.decimal_separator {
                '.'
            } else {
                c
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}
