//! Interactive converter session.

use feedesk_common::{CurrencyCode, CurrencyError, CurrencyFormatter, CurrencyResult};
use feedesk_fx::{ConversionResult, ConversionService, FxResult};
use rust_decimal::Decimal;
use tracing::debug;

/// State of one converter widget: an amount, a direction and the last result.
pub struct ConverterSession {
    service: ConversionService,
    amount: Decimal,
    from: CurrencyCode,
    to: CurrencyCode,
    last: Option<ConversionResult>,
}

impl ConverterSession {
    pub fn new(service: ConversionService, from: CurrencyCode, to: CurrencyCode) -> Self {
        Self {
            service,
            amount: Decimal::ZERO,
            from,
            to,
            last: None,
        }
    }

    pub fn set_amount(&mut self, amount: Decimal) {
        self.amount = amount;
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn from(&self) -> &CurrencyCode {
        &self.from
    }

    pub fn to(&self) -> &CurrencyCode {
        &self.to
    }

    pub fn last(&self) -> Option<&ConversionResult> {
        self.last.as_ref()
    }

    /// Convert the current amount. The amount must be positive.
    pub fn convert(&mut self) -> FxResult<&ConversionResult> {
        if self.amount <= Decimal::ZERO {
            return Err(CurrencyError::invalid_amount("Please enter a valid amount").into());
        }

        let result =
            self.service
                .convert_detailed(self.amount, self.from.as_str(), self.to.as_str())?;
        Ok(self.last.insert(result))
    }

    /// Swap the direction.
    ///
    /// A previous converted amount becomes the new input, then the session
    /// re-converts when there is a positive amount to convert.
    pub fn swap(&mut self) -> FxResult<Option<&ConversionResult>> {
        std::mem::swap(&mut self.from, &mut self.to);

        if let Some(last) = self.last.take() {
            if last.converted_amount > Decimal::ZERO {
                self.amount = last.converted_amount;
            }
        }
        debug!(from = %self.from, to = %self.to, amount = %self.amount, "Swapped currencies");

        if self.amount > Decimal::ZERO {
            self.convert().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Badge text for the last rate, e.g. `1 BDT = 0.0091 USD`.
    pub fn rate_label(&self) -> Option<String> {
        self.last.as_ref().map(|result| {
            let mut rate = result.rate_used.round_dp(4);
            rate.rescale(4);
            format!("1 {} = {} {}", result.from_currency, rate, result.to_currency)
        })
    }

    /// The converted amount for display; zero before the first conversion.
    pub fn display_converted(&self, formatter: &CurrencyFormatter) -> CurrencyResult<String> {
        let value = self
            .last
            .as_ref()
            .map(|r| r.converted_amount)
            .unwrap_or(Decimal::ZERO);
        formatter.format(value, self.to.as_str())
    }
}
