//! Directional exchange rate storage.
//!
//! The table holds an immutable [`RateSnapshot`] behind a pointer that is
//! swapped whole on refresh. Readers clone the `Arc` and never observe a
//! partially updated table.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use feedesk_common::{CurrencyCode, CurrencyRegistry, LookupMode};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::error::{FxError, FxResult};
use crate::rate::{ExchangeRate, RatePair};

/// An immutable set of exchange rates.
#[derive(Debug, Clone)]
pub struct RateSnapshot {
    rates: BTreeMap<RatePair, ExchangeRate>,
    version: u64,
    loaded_at: DateTime<Utc>,
}

impl RateSnapshot {
    /// A snapshot with no rates at version 0.
    pub fn empty() -> Self {
        Self {
            rates: BTreeMap::new(),
            version: 0,
            loaded_at: Utc::now(),
        }
    }

    /// Build a validated snapshot.
    ///
    /// Both codes of every rate must be registered and every rate positive.
    /// Self-pairs are dropped; for duplicate pairs the most recently updated
    /// entry wins.
    pub fn build(
        rates: impl IntoIterator<Item = ExchangeRate>,
        registry: &CurrencyRegistry,
        version: u64,
    ) -> FxResult<Self> {
        let mut map: BTreeMap<RatePair, ExchangeRate> = BTreeMap::new();

        for mut rate in rates {
            rate.from = CurrencyCode::new(rate.from.as_str());
            rate.to = CurrencyCode::new(rate.to.as_str());

            registry.lookup(rate.from.as_str())?;
            registry.lookup(rate.to.as_str())?;
            rate.validate()?;

            let pair = rate.pair();
            if pair.is_identity() {
                warn!(pair = %pair, "Ignoring self-referential rate");
                continue;
            }

            match map.get(&pair) {
                Some(existing) if existing.last_updated > rate.last_updated => {
                    debug!(pair = %pair, "Keeping newer duplicate rate");
                }
                _ => {
                    map.insert(pair, rate);
                }
            }
        }

        Ok(Self {
            rates: map,
            version,
            loaded_at: Utc::now(),
        })
    }

    /// Exact-match lookup.
    pub fn get(&self, from: &str, to: &str) -> Option<&ExchangeRate> {
        self.rates
            .get(&RatePair::new(CurrencyCode::new(from), CurrencyCode::new(to)))
    }

    /// Rate for the pair; a miss is `RateNotFound` in strict mode and `1` in
    /// lenient mode.
    pub fn rate_of(&self, from: &str, to: &str, mode: LookupMode) -> FxResult<Decimal> {
        match self.get(from, to) {
            Some(rate) => Ok(rate.rate),
            None if mode.is_strict() => Err(FxError::RateNotFound {
                from: CurrencyCode::new(from),
                to: CurrencyCode::new(to),
            }),
            None => {
                warn!(from = from, to = to, "No rate stored, using 1");
                Ok(Decimal::ONE)
            }
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Rates ordered by pair.
    pub fn iter(&self) -> impl Iterator<Item = &ExchangeRate> {
        self.rates.values()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Shared exchange rate table with atomic whole-table replacement.
#[derive(Debug)]
pub struct ExchangeRateTable {
    current: RwLock<Arc<RateSnapshot>>,
}

impl ExchangeRateTable {
    pub fn new(snapshot: RateSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Table with no rates.
    pub fn empty() -> Self {
        Self::new(RateSnapshot::empty())
    }

    /// Build a table at version 1 from a list of rates.
    pub fn from_rates(
        rates: impl IntoIterator<Item = ExchangeRate>,
        registry: &CurrencyRegistry,
    ) -> FxResult<Self> {
        Ok(Self::new(RateSnapshot::build(rates, registry, 1)?))
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<RateSnapshot> {
        self.current.read().clone()
    }

    pub fn version(&self) -> u64 {
        self.current.read().version
    }

    /// Rate lookup on the current snapshot.
    pub fn rate_of(&self, from: &str, to: &str, mode: LookupMode) -> FxResult<Decimal> {
        self.snapshot().rate_of(from, to, mode)
    }

    /// Swap in a newer snapshot, returning the one it replaced.
    pub fn replace(&self, snapshot: RateSnapshot) -> FxResult<Arc<RateSnapshot>> {
        let mut current = self.current.write();

        if snapshot.version <= current.version {
            return Err(FxError::StaleSnapshot {
                current: current.version,
                offered: snapshot.version,
            });
        }

        info!(
            from_version = current.version,
            to_version = snapshot.version,
            rates = snapshot.len(),
            "Replacing exchange rate table"
        );

        Ok(std::mem::replace(&mut *current, Arc::new(snapshot)))
    }

    /// Build a snapshot from `rates` at the next version and swap it in.
    ///
    /// The version is assigned under the write lock, so a concurrent upsert
    /// or refresh cannot make this one stale.
    pub fn replace_with(
        &self,
        rates: impl IntoIterator<Item = ExchangeRate>,
        registry: &CurrencyRegistry,
    ) -> FxResult<Arc<RateSnapshot>> {
        let mut current = self.current.write();
        let snapshot = RateSnapshot::build(rates, registry, current.version + 1)?;

        info!(
            from_version = current.version,
            to_version = snapshot.version,
            rates = snapshot.len(),
            "Replacing exchange rate table"
        );

        *current = Arc::new(snapshot);
        Ok(current.clone())
    }

    /// Add or override a single rate.
    ///
    /// Builds a new snapshot from the current rates plus `rate` and swaps it
    /// in whole; the write lock is held so concurrent upserts are not lost.
    pub fn upsert_rate(
        &self,
        rate: ExchangeRate,
        registry: &CurrencyRegistry,
    ) -> FxResult<Arc<RateSnapshot>> {
        let mut current = self.current.write();
        let pair = RatePair::new(
            CurrencyCode::new(rate.from.as_str()),
            CurrencyCode::new(rate.to.as_str()),
        );

        let rates = current
            .iter()
            .filter(|existing| existing.pair() != pair)
            .cloned()
            .chain(std::iter::once(rate));
        let snapshot = RateSnapshot::build(rates, registry, current.version + 1)?;

        info!(pair = %pair, version = snapshot.version, "Custom rate installed");

        *current = Arc::new(snapshot);
        Ok(current.clone())
    }

    /// Current rates ordered by pair.
    pub fn rates(&self) -> Vec<ExchangeRate> {
        self.snapshot().iter().cloned().collect()
    }
}

impl Default for ExchangeRateTable {
    fn default() -> Self {
        Self::empty()
    }
}
