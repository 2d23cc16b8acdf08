//! Exchange rate types.

use chrono::{DateTime, Utc};
use feedesk_common::CurrencyCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FxError, FxResult};

/// Direction of a conversion.
///
/// `BDT/USD` and `USD/BDT` are distinct pairs with independently curated rates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RatePair {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
}

impl RatePair {
    pub fn new(from: CurrencyCode, to: CurrencyCode) -> Self {
        Self { from, to }
    }

    /// The opposite direction.
    pub fn reversed(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for RatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.from, self.to)
    }
}

/// Multiplicative rate converting one unit of `from` into `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: Decimal,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl ExchangeRate {
    /// Create a rate stamped with the current time.
    pub fn new(from: &str, to: &str, rate: Decimal) -> Self {
        Self {
            from: CurrencyCode::new(from),
            to: CurrencyCode::new(to),
            rate,
            last_updated: Utc::now(),
        }
    }

    /// Override the update timestamp.
    pub fn updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = at;
        self
    }

    pub fn pair(&self) -> RatePair {
        RatePair::new(self.from.clone(), self.to.clone())
    }

    /// Rates must be strictly positive.
    pub fn validate(&self) -> FxResult<()> {
        if self.rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate {
                from: self.from.clone(),
                to: self.to.clone(),
                rate: self.rate,
            });
        }
        Ok(())
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1 {} = {} {}", self.from, self.rate, self.to)
    }
}
