//! Wiring of registry, rate table and services.

use std::sync::Arc;

use anyhow::Context as _;
use feedesk_common::{CurrencyFormatter, CurrencyRegistry};
use feedesk_fx::{
    ConversionService, ExchangeRateTable, JsonFileRateSource, RateRefresher, RateSource,
    RefreshConfig, StaticRateSource,
};
use tracing::info;

use crate::config::DeskConfig;

/// Everything a desk command needs, built once at startup.
pub struct DeskContext {
    pub config: DeskConfig,
    pub registry: Arc<CurrencyRegistry>,
    pub table: Arc<ExchangeRateTable>,
    pub source: Arc<dyn RateSource>,
    pub formatter: CurrencyFormatter,
    pub service: ConversionService,
}

impl DeskContext {
    /// Load the registry, fill the rate table from the configured source and
    /// build the services.
    pub async fn load(config: DeskConfig) -> anyhow::Result<Self> {
        let registry = match &config.currencies_file {
            Some(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                CurrencyRegistry::from_json(&json, config.currency.default_currency.as_str())?
            }
            None => CurrencyRegistry::builtin()
                .with_default(config.currency.default_currency.as_str())?,
        };
        config
            .currency
            .validate(&registry)
            .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
        let registry = Arc::new(registry);

        let source: Arc<dyn RateSource> = match &config.rates_file {
            Some(path) => Arc::new(JsonFileRateSource::new(path.clone())),
            None => Arc::new(StaticRateSource::school_defaults()),
        };

        let table = Arc::new(ExchangeRateTable::empty());
        let version = RateRefresher::new(
            source.clone(),
            table.clone(),
            registry.clone(),
            RefreshConfig::default(),
        )
        .refresh_once()
        .await
        .context("loading exchange rates")?;

        info!(
            currencies = registry.len(),
            rates = table.snapshot().len(),
            version,
            source = source.name(),
            mode = %config.currency.mode,
            "Desk context ready"
        );

        let mode = config.currency.mode;
        Ok(Self {
            formatter: CurrencyFormatter::new(registry.clone(), mode),
            service: ConversionService::new(registry.clone(), table.clone(), mode),
            config,
            registry,
            table,
            source,
        })
    }

    /// Refresher feeding this context's table from its source.
    pub fn refresher(&self) -> RateRefresher {
        RateRefresher::new(
            self.source.clone(),
            self.table.clone(),
            self.registry.clone(),
            RefreshConfig {
                interval: self.config.refresh_interval,
                refresh_on_start: false,
            },
        )
    }
}
