//! Rate sources that produce full exchange rate tables.

use std::path::PathBuf;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{FxError, FxResult};
use crate::rate::ExchangeRate;

/// Trait for anything that can produce a complete set of exchange rates.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Get the source name.
    fn name(&self) -> &str;

    /// Fetch every rate the source knows about.
    async fn fetch_rates(&self) -> FxResult<Vec<ExchangeRate>>;
}

/// Source returning a fixed list of rates.
pub struct StaticRateSource {
    name: String,
    rates: Vec<ExchangeRate>,
}

impl StaticRateSource {
    pub fn new(name: impl Into<String>, rates: Vec<ExchangeRate>) -> Self {
        Self {
            name: name.into(),
            rates,
        }
    }

    /// Source serving the fee system's default rate table.
    pub fn school_defaults() -> Self {
        Self::new("STATIC", Self::school_rates())
    }

    /// The default rate table.
    ///
    /// Directions are curated independently, so BDT/USD and USD/BDT are not
    /// reciprocals.
    pub fn school_rates() -> Vec<ExchangeRate> {
        [
            ("BDT", "USD", Decimal::new(91, 4)),
            ("BDT", "EUR", Decimal::new(84, 4)),
            ("BDT", "GBP", Decimal::new(72, 4)),
            ("BDT", "INR", Decimal::new(76, 2)),
            ("USD", "BDT", Decimal::new(1100, 1)),
            ("EUR", "BDT", Decimal::new(1190, 1)),
            ("GBP", "BDT", Decimal::new(1380, 1)),
            ("INR", "BDT", Decimal::new(132, 2)),
        ]
        .into_iter()
        .map(|(from, to, rate)| ExchangeRate::new(from, to, rate))
        .collect()
    }
}

#[async_trait]
impl RateSource for StaticRateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rates(&self) -> FxResult<Vec<ExchangeRate>> {
        Ok(self.rates.clone())
    }
}

/// Source reading a JSON array of rates from disk on every fetch.
pub struct JsonFileRateSource {
    path: PathBuf,
}

impl JsonFileRateSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl RateSource for JsonFileRateSource {
    fn name(&self) -> &str {
        "JSON_FILE"
    }

    async fn fetch_rates(&self) -> FxResult<Vec<ExchangeRate>> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            FxError::SourceError(format!("reading {}: {}", self.path.display(), e))
        })?;

        let rates: Vec<ExchangeRate> = serde_json::from_str(&contents).map_err(|e| {
            FxError::SourceError(format!("decoding {}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), rates = rates.len(), "Loaded rates from file");
        Ok(rates)
    }
}

/// Mock rate source for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateSource {
    name: String,
    rates: parking_lot::Mutex<Vec<ExchangeRate>>,
    failure: parking_lot::Mutex<Option<String>>,
    fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: parking_lot::Mutex::new(Vec::new()),
            failure: parking_lot::Mutex::new(None),
            fetches: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Set the rates returned by the next fetches and clear any failure.
    pub fn set_rates(&self, rates: Vec<ExchangeRate>) {
        *self.rates.lock() = rates;
        *self.failure.lock() = None;
    }

    /// Make the next fetches fail.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateSource for MockRateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_rates(&self) -> FxResult<Vec<ExchangeRate>> {
        self.fetches.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if let Some(message) = self.failure.lock().clone() {
            return Err(FxError::SourceError(message));
        }
        Ok(self.rates.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_school_rates() {
        let rates = StaticRateSource::school_rates();

        assert_eq!(rates.len(), 8);
        let bdt_usd = rates
            .iter()
            .find(|r| r.from.as_str() == "BDT" && r.to.as_str() == "USD")
            .unwrap();
        assert_eq!(bdt_usd.rate, dec!(0.0091));
    }

    #[test]
    fn test_static_source() {
        let source = StaticRateSource::school_defaults();

        let rates = tokio_test::block_on(source.fetch_rates()).unwrap();

        assert_eq!(source.name(), "STATIC");
        assert_eq!(rates.len(), 8);
    }

    #[tokio::test]
    async fn test_json_file_source() {
        let path = std::env::temp_dir().join(format!(
            "feedesk-rates-{}.json",
            std::process::id()
        ));
        tokio::fs::write(
            &path,
            r#"[
                {"from": "BDT", "to": "USD", "rate": "0.0093"},
                {"from": "USD", "to": "BDT", "rate": 108.5,
                 "last_updated": "2024-01-15T10:30:00Z"}
            ]"#,
        )
        .await
        .unwrap();

        let source = JsonFileRateSource::new(path.clone());
        let rates = source.fetch_rates().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].rate, dec!(0.0093));
        assert_eq!(rates[1].rate, dec!(108.5));
    }

    #[tokio::test]
    async fn test_json_file_source_missing_file() {
        let source = JsonFileRateSource::new("/nonexistent/feedesk/rates.json");

        assert!(matches!(
            source.fetch_rates().await,
            Err(FxError::SourceError(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_source() {
        let source = MockRateSource::new("mock");
        source.set_rates(vec![ExchangeRate::new("BDT", "USD", dec!(0.0091))]);

        assert_eq!(source.fetch_rates().await.unwrap().len(), 1);

        source.fail_with("offline");
        assert!(source.fetch_rates().await.is_err());
        assert_eq!(source.fetch_count(), 2);
    }
}
