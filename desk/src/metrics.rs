//! Payment metrics.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::payment::PaymentMethod;

/// Per-method counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodStats {
    pub attempts: u64,
    pub successes: u64,
    /// Sum of successful payment values, saturating at `Decimal::MAX`.
    pub collected: Decimal,
}

/// Payment metrics.
#[derive(Debug, Clone, Default)]
pub struct PaymentMetrics {
    /// Total payments attempted.
    pub total_payments: u64,
    pub successful_payments: u64,
    pub failed_payments: u64,
    by_method: BTreeMap<PaymentMethod, MethodStats>,
}

impl PaymentMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed payment.
    pub fn record_success(&mut self, method: PaymentMethod, amount: Decimal) {
        self.total_payments += 1;
        self.successful_payments += 1;

        let stats = self.by_method.entry(method).or_default();
        stats.attempts += 1;
        stats.successes += 1;
        stats.collected = stats.collected.saturating_add(amount);
    }

    /// Record a declined payment.
    pub fn record_failure(&mut self, method: PaymentMethod) {
        self.total_payments += 1;
        self.failed_payments += 1;
        self.by_method.entry(method).or_default().attempts += 1;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_payments == 0 {
            return 0.0;
        }

        self.successful_payments as f64 / self.total_payments as f64
    }

    /// Total collected through `method`.
    pub fn collected(&self, method: PaymentMethod) -> Decimal {
        self.by_method
            .get(&method)
            .map(|s| s.collected)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn method_stats(&self) -> impl Iterator<Item = (&PaymentMethod, &MethodStats)> {
        self.by_method.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_metrics() {
        let mut metrics = PaymentMetrics::new();

        metrics.record_success(PaymentMethod::Bkash, dec!(1000));
        metrics.record_success(PaymentMethod::Bkash, dec!(500));
        metrics.record_success(PaymentMethod::Nagad, dec!(250));
        metrics.record_failure(PaymentMethod::Nagad);

        assert_eq!(metrics.total_payments, 4);
        assert_eq!(metrics.successful_payments, 3);
        assert_eq!(metrics.failed_payments, 1);
        assert_eq!(metrics.success_rate(), 0.75);
        assert_eq!(metrics.collected(PaymentMethod::Bkash), dec!(1500));
        assert_eq!(metrics.collected(PaymentMethod::Upay), Decimal::ZERO);

        let nagad: Vec<_> = metrics
            .method_stats()
            .filter(|(m, _)| **m == PaymentMethod::Nagad)
            .map(|(_, s)| s.clone())
            .collect();
        assert_eq!(
            nagad,
            vec![MethodStats {
                attempts: 2,
                successes: 1,
                collected: dec!(250),
            }]
        );
    }

    #[test]
    fn test_collected_saturates() {
        let mut metrics = PaymentMetrics::new();

        metrics.record_success(PaymentMethod::BankTransfer, Decimal::MAX);
        metrics.record_success(PaymentMethod::BankTransfer, dec!(1));

        assert_eq!(metrics.collected(PaymentMethod::BankTransfer), Decimal::MAX);
        assert_eq!(metrics.successful_payments, 2);
    }

    #[test]
    fn test_empty_metrics() {
        assert_eq!(PaymentMetrics::new().success_rate(), 0.0);
    }
}
