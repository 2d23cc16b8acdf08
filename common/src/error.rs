//! Error types for currency handling.

use thiserror::Error;

/// Errors raised by the currency registry and formatter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// Amount is NaN, infinite, out of range, or negative where that is not allowed.
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Currency code is not registered.
    #[error("Unknown currency code: {0}")]
    UnknownCurrencyCode(String),

    /// Currency code is not three ASCII letters.
    #[error("Invalid currency code: {0:?}")]
    InvalidCurrencyCode(String),

    /// Text could not be parsed as an amount.
    #[error("Unparseable amount: {0:?}")]
    UnparseableAmount(String),

    /// Currency definition failed validation.
    #[error("Invalid definition for {code}: {reason}")]
    InvalidDefinition { code: String, reason: String },

    /// Registry document could not be decoded.
    #[error("Invalid currency document: {0}")]
    Json(String),
}

impl CurrencyError {
    /// Shorthand for [`CurrencyError::InvalidAmount`].
    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        CurrencyError::InvalidAmount {
            reason: reason.into(),
        }
    }

    /// Get a stable error code for callers that surface errors to users.
    pub fn error_code(&self) -> &'static str {
        match self {
            CurrencyError::InvalidAmount { .. } => "INVALID_AMOUNT",
            CurrencyError::UnknownCurrencyCode(_) => "UNKNOWN_CURRENCY_CODE",
            CurrencyError::InvalidCurrencyCode(_) => "INVALID_CURRENCY_CODE",
            CurrencyError::UnparseableAmount(_) => "UNPARSEABLE_AMOUNT",
            CurrencyError::InvalidDefinition { .. } => "INVALID_DEFINITION",
            CurrencyError::Json(_) => "INVALID_DOCUMENT",
        }
    }
}

impl From<serde_json::Error> for CurrencyError {
    fn from(err: serde_json::Error) -> Self {
        CurrencyError::Json(err.to_string())
    }
}

/// Result type alias for currency operations.
pub type CurrencyResult<T> = std::result::Result<T, CurrencyError>;
