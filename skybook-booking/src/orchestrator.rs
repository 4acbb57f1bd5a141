use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use skybook_core::payment::{PaymentAdapter, PaymentReceipt, PaymentRequest, PaymentStatus};
use skybook_core::CollaboratorError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Fronts the payment collaborator and issues booking references.
#[derive(Clone)]
pub struct PaymentOrchestrator {
    adapter: Arc<dyn PaymentAdapter>,
    booking_prefix: String,
}

impl PaymentOrchestrator {
    pub fn new(adapter: Arc<dyn PaymentAdapter>) -> Self {
        Self {
            adapter,
            booking_prefix: "SB".to_string(),
        }
    }

    pub fn with_booking_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.booking_prefix = prefix.into();
        self
    }

    pub async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, CollaboratorError> {
        self.adapter.charge(request).await
    }

    /// Booking id (prefix + 8 digits) and a six character PNR.
    pub fn issue_references(&self) -> (String, String) {
        let digits = Utc::now().timestamp_millis().rem_euclid(100_000_000);
        let booking_id = format!("{}{:08}", self.booking_prefix, digits);
        let pnr = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(|b| char::from(b).to_ascii_uppercase())
            .collect();
        (booking_id, pnr)
    }
}

/// In-process stand-in for the payment gateway.
///
/// Approves every charge unless told to fail or decline the next `n` calls.
#[derive(Default)]
pub struct MockPaymentAdapter {
    fail_next: AtomicUsize,
    decline_next: AtomicUsize,
    charges: Mutex<Vec<i64>>,
}

impl MockPaymentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(n: usize) -> Self {
        Self {
            fail_next: AtomicUsize::new(n),
            ..Self::default()
        }
    }

    /// Gateway answers, but with a declined receipt.
    pub fn declining_first(n: usize) -> Self {
        Self {
            decline_next: AtomicUsize::new(n),
            ..Self::default()
        }
    }

    /// Amounts of every approved charge, in order.
    pub fn approved_charges(&self) -> Vec<i64> {
        self.charges.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl PaymentAdapter for MockPaymentAdapter {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, CollaboratorError> {
        if take_one(&self.fail_next) {
            return Err("Simulated payment gateway failure".into());
        }
        if take_one(&self.decline_next) {
            return Ok(PaymentReceipt {
                transaction_id: format!("TXN{}", Utc::now().timestamp_millis()),
                status: PaymentStatus::Declined,
                processed_at: Utc::now(),
            });
        }

        if let Ok(mut charges) = self.charges.lock() {
            charges.push(request.amount_cents);
        }

        Ok(PaymentReceipt {
            transaction_id: format!("TXN{}", Utc::now().timestamp_millis()),
            status: PaymentStatus::Succeeded,
            processed_at: Utc::now(),
        })
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use skybook_core::payment::{PaymentDetails, PaymentMethod};
    use uuid::Uuid;

    fn request(amount: i64) -> PaymentRequest {
        PaymentRequest {
            draft_id: Uuid::new_v4(),
            customer_id: None,
            method: PaymentMethod::Upi,
            amount_cents: amount,
            currency: "USD".to_string(),
            details: PaymentDetails::upi("ana@upi"),
        }
    }

    #[test]
    fn test_reference_format() {
        let orchestrator = PaymentOrchestrator::new(Arc::new(MockPaymentAdapter::new()));
        let (booking_id, pnr) = orchestrator.issue_references();

        assert!(booking_id.starts_with("SB"));
        assert_eq!(booking_id.len(), 10);
        assert!(booking_id[2..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(pnr.len(), 6);
        assert!(pnr.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_mock_fails_then_recovers() {
        let adapter = Arc::new(MockPaymentAdapter::failing_first(1));
        let orchestrator = PaymentOrchestrator::new(adapter.clone());

        assert!(orchestrator.charge(&request(1000)).await.is_err());
        let receipt = orchestrator.charge(&request(1000)).await.unwrap();
        assert_eq!(receipt.status, PaymentStatus::Succeeded);
        assert_eq!(adapter.approved_charges(), vec![1000]);
    }

    #[tokio::test]
    async fn test_mock_declines_without_recording() {
        let adapter = Arc::new(MockPaymentAdapter::declining_first(1));
        let orchestrator = PaymentOrchestrator::new(adapter.clone());

        let receipt = orchestrator.charge(&request(1000)).await.unwrap();
        assert_eq!(receipt.status, PaymentStatus::Declined);
        assert!(adapter.approved_charges().is_empty());
    }
}
