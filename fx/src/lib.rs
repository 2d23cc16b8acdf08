//! FeeDesk FX
//!
//! Exchange rate storage and currency conversion for the fee system.
//!
//! # Features
//!
//! - Directional rate table with atomic whole-table replacement
//! - Strict or lenient handling of unknown codes and missing rates
//! - Pluggable rate sources with periodic refresh
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use feedesk_common::{CurrencyRegistry, LookupMode};
//! use feedesk_fx::{ConversionService, ExchangeRateTable, StaticRateSource};
//!
//! let registry = Arc::new(CurrencyRegistry::builtin());
//! let table = ExchangeRateTable::from_rates(StaticRateSource::school_rates(), &registry)?;
//! let service = ConversionService::new(registry, Arc::new(table), LookupMode::Strict);
//!
//! let usd = service.convert(dec!(100), "BDT", "USD")?; // 0.91
//! ```

pub mod conversion;
pub mod error;
pub mod provider;
pub mod rate;
pub mod refresh;
pub mod table;

pub use conversion::{ConversionResult, ConversionService};
pub use error::{FxError, FxResult};
pub use provider::{JsonFileRateSource, RateSource, StaticRateSource};
#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateSource;
pub use rate::{ExchangeRate, RatePair};
pub use refresh::{RateRefresher, RefreshConfig};
pub use table::{ExchangeRateTable, RateSnapshot};
