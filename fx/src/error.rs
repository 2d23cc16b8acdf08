//! FX error types.

use feedesk_common::{CurrencyCode, CurrencyError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in rate lookup and conversion.
#[derive(Debug, Error)]
pub enum FxError {
    /// Invalid amount or unknown currency code.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// No rate stored for the requested direction.
    #[error("Rate not found for {from}/{to}")]
    RateNotFound { from: CurrencyCode, to: CurrencyCode },

    /// Rate is zero or negative.
    #[error("Invalid rate {rate} for {from}/{to}")]
    InvalidRate {
        from: CurrencyCode,
        to: CurrencyCode,
        rate: Decimal,
    },

    /// Offered snapshot is not newer than the installed one.
    #[error("Stale snapshot: version {offered} is not newer than {current}")]
    StaleSnapshot { current: u64, offered: u64 },

    /// Rate source failed to produce rates.
    #[error("Rate source error: {0}")]
    SourceError(String),
}

impl FxError {
    /// Get a stable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::Currency(e) => e.error_code(),
            FxError::RateNotFound { .. } => "RATE_NOT_FOUND",
            FxError::InvalidRate { .. } => "INVALID_RATE",
            FxError::StaleSnapshot { .. } => "STALE_SNAPSHOT",
            FxError::SourceError(_) => "RATE_SOURCE_ERROR",
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
