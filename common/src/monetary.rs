//! Monetary amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::CurrencyCode;
use crate::error::{CurrencyError, CurrencyResult};

/// A monetary amount with currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount value (high precision decimal).
    pub value: Decimal,
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a new Money instance.
    pub fn new(value: Decimal, currency: CurrencyCode) -> Self {
        Self { value, currency }
    }

    /// Create from a decimal string such as `"1500.00"`.
    pub fn parse(value: &str, currency: CurrencyCode) -> CurrencyResult<Self> {
        let value = value
            .trim()
            .parse::<Decimal>()
            .map_err(|_| CurrencyError::UnparseableAmount(value.to_string()))?;
        Ok(Self { value, currency })
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            value: Decimal::ZERO,
            currency,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.currency)
    }
}

/// Convert a floating point amount into a decimal.
///
/// NaN, infinities and values outside the decimal range are rejected.
pub fn amount_from_f64(value: f64) -> CurrencyResult<Decimal> {
    if value.is_nan() {
        return Err(CurrencyError::invalid_amount("amount is NaN"));
    }
    if value.is_infinite() {
        return Err(CurrencyError::invalid_amount("amount is infinite"));
    }
    Decimal::try_from(value)
        .map_err(|_| CurrencyError::invalid_amount(format!("{value} is out of range")))
}

/// Reject negative amounts.
pub fn ensure_non_negative(amount: Decimal) -> CurrencyResult<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CurrencyError::invalid_amount(format!(
            "{amount} is negative"
        )));
    }
    Ok(amount)
}
