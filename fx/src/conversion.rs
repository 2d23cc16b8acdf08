//! Currency conversion.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use feedesk_common::{
    amount_from_f64, ensure_non_negative, CurrencyCode, CurrencyError, CurrencyRegistry,
    LookupMode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::FxResult;
use crate::table::{ExchangeRateTable, RateSnapshot};

/// Outcome of a single conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub amount: Decimal,
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    /// Full precision; rounding is left to the formatter.
    pub converted_amount: Decimal,
    pub rate_used: Decimal,
    pub converted_at: DateTime<Utc>,
}

/// Converts amounts between currencies using the current rate table.
#[derive(Debug, Clone)]
pub struct ConversionService {
    registry: Arc<CurrencyRegistry>,
    table: Arc<ExchangeRateTable>,
    mode: LookupMode,
}

impl ConversionService {
    pub fn new(
        registry: Arc<CurrencyRegistry>,
        table: Arc<ExchangeRateTable>,
        mode: LookupMode,
    ) -> Self {
        Self {
            registry,
            table,
            mode,
        }
    }

    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    pub fn registry(&self) -> &Arc<CurrencyRegistry> {
        &self.registry
    }

    pub fn table(&self) -> &Arc<ExchangeRateTable> {
        &self.table
    }

    /// Rate converting one unit of `from` into `to`.
    ///
    /// Equal codes give 1 without consulting the table.
    pub fn rate_of(&self, from: &str, to: &str) -> FxResult<Decimal> {
        self.rate_in(&self.table.snapshot(), from, to)
    }

    /// Convert `amount` from one currency to another.
    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> FxResult<Decimal> {
        Ok(self.convert_detailed(amount, from, to)?.converted_amount)
    }

    /// Convert a floating point amount, rejecting NaN and infinities.
    pub fn convert_f64(&self, amount: f64, from: &str, to: &str) -> FxResult<Decimal> {
        let amount = amount_from_f64(amount)?;
        self.convert(amount, from, to)
    }

    /// Convert and report the rate used.
    ///
    /// Rate and result come from the same table snapshot.
    #[instrument(skip(self), fields(mode = %self.mode))]
    pub fn convert_detailed(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> FxResult<ConversionResult> {
        let amount = ensure_non_negative(amount)?;
        let snapshot = self.table.snapshot();
        let rate = self.rate_in(&snapshot, from, to)?;

        let converted_amount = if same_currency(from, to) {
            amount
        } else {
            amount.checked_mul(rate).ok_or_else(|| {
                CurrencyError::invalid_amount("converted amount is out of range")
            })?
        };

        debug!(
            rate = %rate,
            converted = %converted_amount,
            table_version = snapshot.version(),
            "Converted amount"
        );

        Ok(ConversionResult {
            amount,
            from_currency: CurrencyCode::new(from),
            to_currency: CurrencyCode::new(to),
            converted_amount,
            rate_used: rate,
            converted_at: Utc::now(),
        })
    }

    fn rate_in(&self, snapshot: &RateSnapshot, from: &str, to: &str) -> FxResult<Decimal> {
        if self.mode.is_strict() {
            self.registry.lookup(from)?;
            self.registry.lookup(to)?;
        }

        if same_currency(from, to) {
            return Ok(Decimal::ONE);
        }

        snapshot.rate_of(from, to, self.mode)
    }
}

fn same_currency(from: &str, to: &str) -> bool {
    CurrencyCode::new(from) == CurrencyCode::new(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FxError;
    use crate::provider::StaticRateSource;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn service(mode: LookupMode) -> ConversionService {
        let registry = Arc::new(CurrencyRegistry::builtin());
        let table = ExchangeRateTable::from_rates(StaticRateSource::school_rates(), &registry)
            .unwrap();
        ConversionService::new(registry, Arc::new(table), mode)
    }

    #[test]
    fn test_convert_bdt_to_usd() {
        let service = service(LookupMode::Strict);

        assert_eq!(service.convert(dec!(100), "BDT", "USD").unwrap(), dec!(0.91));
        assert_eq!(service.convert_f64(100.0, "BDT", "USD").unwrap(), dec!(0.91));
    }

    #[test]
    fn test_rates_are_directional() {
        let service = service(LookupMode::Strict);

        assert_eq!(service.rate_of("BDT", "USD").unwrap(), dec!(0.0091));
        assert_eq!(service.rate_of("USD", "BDT").unwrap(), dec!(110.0));
    }

    #[test]
    fn test_identity_rate_skips_table() {
        let service = service(LookupMode::Strict);

        assert_eq!(service.rate_of("EUR", "EUR").unwrap(), Decimal::ONE);
        assert_eq!(service.convert(dec!(42.42), "EUR", "eur").unwrap(), dec!(42.42));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let service = service(LookupMode::Lenient);

        let result = service.convert(dec!(-5), "BDT", "USD");

        assert!(matches!(
            result,
            Err(FxError::Currency(CurrencyError::InvalidAmount { .. }))
        ));
    }

    #[test]
    fn test_non_finite_amount_rejected() {
        let service = service(LookupMode::Strict);

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                service.convert_f64(bad, "BDT", "USD"),
                Err(FxError::Currency(CurrencyError::InvalidAmount { .. }))
            ));
        }
        assert!(service.convert_f64(-5.0, "BDT", "USD").is_err());
    }

    #[test]
    fn test_out_of_range_result_rejected() {
        let service = service(LookupMode::Strict);

        assert!(matches!(
            service.convert(Decimal::from_i128_with_scale(10i128.pow(27), 0), "USD", "BDT"),
            Err(FxError::Currency(CurrencyError::InvalidAmount { .. }))
        ));
        assert!(matches!(
            service.convert_f64(1e27, "GBP", "BDT"),
            Err(FxError::Currency(CurrencyError::InvalidAmount { .. }))
        ));
        // Identity never multiplies
        assert_eq!(service.convert(Decimal::MAX, "USD", "USD").unwrap(), Decimal::MAX);
    }

    #[test]
    fn test_full_precision_result() {
        let service = service(LookupMode::Strict);

        assert_eq!(
            service.convert(dec!(1234.567), "BDT", "USD").unwrap(),
            dec!(11.2345597)
        );
    }

    #[test]
    fn test_missing_rate_strict_and_lenient() {
        assert!(matches!(
            service(LookupMode::Strict).convert(dec!(10), "USD", "EUR"),
            Err(FxError::RateNotFound { .. })
        ));
        assert_eq!(
            service(LookupMode::Lenient)
                .convert(dec!(10), "USD", "EUR")
                .unwrap(),
            dec!(10)
        );
    }

    #[test]
    fn test_unknown_code_strict_and_lenient() {
        assert!(matches!(
            service(LookupMode::Strict).convert(dec!(10), "XYZ", "XYZ"),
            Err(FxError::Currency(CurrencyError::UnknownCurrencyCode(_)))
        ));
        assert!(matches!(
            service(LookupMode::Strict).rate_of("BDT", "XYZ"),
            Err(FxError::Currency(CurrencyError::UnknownCurrencyCode(_)))
        ));
        assert_eq!(
            service(LookupMode::Lenient).rate_of("BDT", "XYZ").unwrap(),
            Decimal::ONE
        );
    }

    #[test]
    fn test_convert_detailed() {
        let service = service(LookupMode::Strict);

        let result = service.convert_detailed(dec!(1000), "usd", "bdt").unwrap();

        assert_eq!(result.amount, dec!(1000));
        assert_eq!(result.from_currency, CurrencyCode::usd());
        assert_eq!(result.to_currency, CurrencyCode::bdt());
        assert_eq!(result.rate_used, dec!(110.0));
        assert_eq!(result.converted_amount, dec!(110000));
    }

    #[test]
    fn test_conversion_sees_replaced_table() {
        let service = service(LookupMode::Strict);
        service
            .table()
            .upsert_rate(
                crate::rate::ExchangeRate::new("BDT", "USD", dec!(0.01)),
                service.registry(),
            )
            .unwrap();

        assert_eq!(service.convert(dec!(100), "BDT", "USD").unwrap(), dec!(1));
    }

    proptest! {
        #[test]
        fn prop_same_currency_is_identity(units in 0i64..i64::MAX, scale in 0u32..10, idx in 0usize..5) {
            let service = service(LookupMode::Strict);
            let code = service.registry().codes().nth(idx).unwrap().to_string();
            let amount = Decimal::new(units, scale);

            prop_assert_eq!(service.convert(amount, &code, &code).unwrap(), amount);
        }
    }
}
