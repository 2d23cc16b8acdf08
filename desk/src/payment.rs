//! Fee payment processing.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use feedesk_common::{CurrencyError, CurrencyFormatter, Money, TransactionId};

use crate::config::PaymentConfig;
use crate::metrics::PaymentMetrics;

/// Supported payment channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Bkash,
    Nagad,
    Rocket,
    Upay,
    CreditCard,
    DebitCard,
    BankTransfer,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 7] = [
        PaymentMethod::Bkash,
        PaymentMethod::Nagad,
        PaymentMethod::Rocket,
        PaymentMethod::Upay,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
    ];

    /// Kebab-case identifier.
    pub fn id(&self) -> &'static str {
        match self {
            PaymentMethod::Bkash => "bkash",
            PaymentMethod::Nagad => "nagad",
            PaymentMethod::Rocket => "rocket",
            PaymentMethod::Upay => "upay",
            PaymentMethod::CreditCard => "credit-card",
            PaymentMethod::DebitCard => "debit-card",
            PaymentMethod::BankTransfer => "bank-transfer",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Bkash => "bKash",
            PaymentMethod::Nagad => "Nagad",
            PaymentMethod::Rocket => "Rocket",
            PaymentMethod::Upay => "Upay",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
        }
    }

    /// Mobile wallets authenticate with a phone number and PIN.
    pub fn is_mobile_wallet(&self) -> bool {
        matches!(
            self,
            PaymentMethod::Bkash | PaymentMethod::Nagad | PaymentMethod::Rocket | PaymentMethod::Upay
        )
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.id() == wanted)
            .ok_or_else(|| format!("unknown payment method: {s}"))
    }
}

/// Errors raised before a payment reaches the gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Invalid payment request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Currency(#[from] CurrencyError),
}

/// A fee payment to process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Money,
    pub student_name: String,
    pub fee_type: String,
    pub method: PaymentMethod,
}

impl PaymentRequest {
    pub fn new(
        amount: Money,
        student_name: impl Into<String>,
        fee_type: impl Into<String>,
        method: PaymentMethod,
    ) -> Self {
        Self {
            amount,
            student_name: student_name.into(),
            fee_type: fee_type.into(),
            method,
        }
    }

    pub fn validate(&self) -> Result<(), PaymentError> {
        if !self.amount.is_positive() {
            return Err(PaymentError::Currency(CurrencyError::invalid_amount(
                format!("payment amount {} must be positive", self.amount.value),
            )));
        }
        if self.student_name.trim().is_empty() {
            return Err(PaymentError::InvalidRequest(
                "student name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Proof of a completed payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub transaction_id: TransactionId,
    pub method: PaymentMethod,
    pub amount: Money,
    pub formatted_amount: String,
    pub student_name: String,
    pub fee_type: String,
    pub processed_at: DateTime<Utc>,
}

/// Result of handing a request to a processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PaymentOutcome {
    Completed(PaymentReceipt),
    Declined {
        method: PaymentMethod,
        reason: String,
    },
}

impl PaymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PaymentOutcome::Completed(_))
    }
}

/// Anything that can take a fee payment.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    fn name(&self) -> &str;

    /// Process a payment. Declines are outcomes, not errors.
    async fn process(&self, request: PaymentRequest) -> Result<PaymentOutcome, PaymentError>;
}

/// Gateway that succeeds at random with a configured probability.
pub struct SimulatedGateway {
    config: PaymentConfig,
    formatter: CurrencyFormatter,
    rng: Mutex<StdRng>,
    metrics: Mutex<PaymentMetrics>,
}

impl SimulatedGateway {
    pub fn new(config: PaymentConfig, formatter: CurrencyFormatter, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            formatter,
            rng: Mutex::new(rng),
            metrics: Mutex::new(PaymentMetrics::new()),
        }
    }

    pub fn metrics(&self) -> PaymentMetrics {
        self.metrics.lock().clone()
    }

    fn roll(&self) -> bool {
        let rate = self.config.success_rate.clamp(0.0, 1.0);
        self.rng.lock().gen_bool(rate)
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedGateway {
    fn name(&self) -> &str {
        "SIMULATED"
    }

    #[instrument(skip(self, request), fields(method = %request.method, amount = %request.amount))]
    async fn process(&self, request: PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        request.validate()?;
        let formatted_amount = self
            .formatter
            .format(request.amount.value, request.amount.currency.as_str())?;

        if !self.config.processing_delay.is_zero() {
            tokio::time::sleep(self.config.processing_delay).await;
        }

        if self.roll() {
            let receipt = PaymentReceipt {
                transaction_id: TransactionId::new(),
                method: request.method,
                amount: request.amount,
                formatted_amount,
                student_name: request.student_name,
                fee_type: request.fee_type,
                processed_at: Utc::now(),
            };
            self.metrics
                .lock()
                .record_success(receipt.method, receipt.amount.value);

            info!(
                transaction_id = %receipt.transaction_id,
                amount = %receipt.formatted_amount,
                "Payment completed"
            );
            Ok(PaymentOutcome::Completed(receipt))
        } else {
            self.metrics.lock().record_failure(request.method);

            warn!(student = %request.student_name, "Payment declined");
            Ok(PaymentOutcome::Declined {
                method: request.method,
                reason: "Payment failed. Please try again.".to_string(),
            })
        }
    }
}
