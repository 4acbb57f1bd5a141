use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skybook_shared::Masked;
use uuid::Uuid;

use crate::CollaboratorError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Upi,
    NetBanking,
}

impl PaymentMethod {
    /// Names of the detail fields this method cannot go without.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            PaymentMethod::Card => &["card_number", "card_holder", "expiry_date", "cvv"],
            PaymentMethod::Upi => &["upi_id"],
            PaymentMethod::NetBanking => &["bank"],
        }
    }
}

/// Raw payment form input. Fields unrelated to the chosen method are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub card_number: Option<Masked<String>>,
    pub card_holder: Option<String>,
    pub expiry_date: Option<String>,
    pub cvv: Option<Masked<String>>,
    pub upi_id: Option<String>,
    pub bank: Option<String>,
}

impl PaymentDetails {
    pub fn card(number: &str, holder: &str, expiry: &str, cvv: &str) -> Self {
        Self {
            card_number: Some(Masked::from(number)),
            card_holder: Some(holder.to_string()),
            expiry_date: Some(expiry.to_string()),
            cvv: Some(Masked::from(cvv)),
            ..Default::default()
        }
    }

    pub fn upi(upi_id: &str) -> Self {
        Self {
            upi_id: Some(upi_id.to_string()),
            ..Default::default()
        }
    }

    pub fn net_banking(bank: &str) -> Self {
        Self {
            bank: Some(bank.to_string()),
            ..Default::default()
        }
    }

    /// Required fields for `method` that are absent or blank.
    pub fn missing_fields(&self, method: PaymentMethod) -> Vec<&'static str> {
        method
            .required_fields()
            .iter()
            .copied()
            .filter(|field| !self.has(field))
            .collect()
    }

    fn has(&self, field: &str) -> bool {
        fn present(v: &Option<String>) -> bool {
            v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
        }
        match field {
            "card_number" => self.card_number.as_ref().map(|v| !v.is_blank()).unwrap_or(false),
            "cvv" => self.cvv.as_ref().map(|v| !v.is_blank()).unwrap_or(false),
            "card_holder" => present(&self.card_holder),
            "expiry_date" => present(&self.expiry_date),
            "upi_id" => present(&self.upi_id),
            "bank" => present(&self.bank),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Succeeded,
    Declined,
    Processing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Booking draft being paid for; doubles as the idempotency reference.
    pub draft_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub method: PaymentMethod,
    pub amount_cents: i64,
    pub currency: String,
    pub details: PaymentDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub transaction_id: String,
    pub status: PaymentStatus,
    pub processed_at: DateTime<Utc>,
}

/// Payment collaborator. Latency is opaque; the call eventually resolves or rejects.
#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, CollaboratorError>;
}
