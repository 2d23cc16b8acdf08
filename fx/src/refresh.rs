//! Periodic rate table refresh.

use std::sync::Arc;
use std::time::Duration;

use feedesk_common::CurrencyRegistry;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::error::FxResult;
use crate::provider::RateSource;
use crate::table::ExchangeRateTable;

/// Configuration for the refresher.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between refreshes.
    pub interval: Duration,
    /// Whether to refresh once immediately on spawn.
    pub refresh_on_start: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            refresh_on_start: true,
        }
    }
}

/// Pulls full tables from a [`RateSource`] and swaps them into an
/// [`ExchangeRateTable`].
pub struct RateRefresher {
    source: Arc<dyn RateSource>,
    table: Arc<ExchangeRateTable>,
    registry: Arc<CurrencyRegistry>,
    config: RefreshConfig,
}

impl RateRefresher {
    pub fn new(
        source: Arc<dyn RateSource>,
        table: Arc<ExchangeRateTable>,
        registry: Arc<CurrencyRegistry>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            source,
            table,
            registry,
            config,
        }
    }

    /// Fetch once and install the result, returning the new table version.
    ///
    /// On any failure the current table stays in place.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn refresh_once(&self) -> FxResult<u64> {
        let rates = self.source.fetch_rates().await?;
        let snapshot = self.table.replace_with(rates, &self.registry)?;

        info!(
            version = snapshot.version(),
            rates = snapshot.len(),
            "Exchange rates refreshed"
        );
        Ok(snapshot.version())
    }

    /// Refresh on a fixed interval until the returned handle is aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            if !self.config.refresh_on_start {
                ticker.tick().await;
            }

            loop {
                ticker.tick().await;
                if let Err(e) = self.refresh_once().await {
                    warn!(error = %e, code = e.error_code(), "Rate refresh failed, keeping current table");
                }
            }
        })
    }
}
