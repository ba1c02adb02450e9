use super::ledger::PaymentLedger;
use crate::domain::notice::Notice;
use crate::domain::ports::PaymentGatewayBox;
use crate::domain::wizard::{PaymentIntent, WizardEvent, WizardSession};
use crate::error::{Result, StaffPayError};
use chrono::Utc;
use tracing::{info, warn};

/// Drives the confirmation step of a wizard session through a gateway.
///
/// Both operations return `Err` only when the session refuses to move (wrong
/// step, malformed OTP). Gateway and ledger failures come back as error
/// notices with the session put back where the user can retry.
pub struct Checkout {
    gateway: PaymentGatewayBox,
}

impl Checkout {
    pub fn new(gateway: PaymentGatewayBox) -> Self {
        Self { gateway }
    }

    /// Asks the gateway to start the payment; on success the OTP input opens.
    pub async fn initiate(&self, session: &mut WizardSession) -> Result<Notice> {
        let initiating = session.apply(WizardEvent::InitiatePayment)?;
        let intent = intent_of(&initiating)?;
        *session = initiating;

        match self.gateway.initiate(&intent).await {
            Ok(()) => {
                *session = session.apply(WizardEvent::GatewayAccepted)?;
                info!(teacher = %intent.teacher_name, amount = %intent.amount, "payment initiated");
                Ok(Notice::info("OTP sent to your registered mobile number")
                    .with_description("Please enter the 6-digit code to complete the payment"))
            }
            Err(e) => {
                warn!(error = %e, "payment initiation failed");
                *session = session.apply(WizardEvent::GatewayRejected)?;
                Ok(Notice::error("Payment initiation failed")
                    .with_description("Please try again or contact support"))
            }
        }
    }

    /// Verifies the entered OTP and, once the gateway accepts it, records the
    /// payment in `ledger`.
    pub async fn verify(
        &self,
        session: &mut WizardSession,
        ledger: &mut PaymentLedger,
    ) -> Result<Notice> {
        let verifying = session.apply(WizardEvent::VerifyOtp)?;
        let intent = intent_of(&verifying)?;
        *session = verifying;

        if let Err(e) = self.gateway.verify(&intent, session.otp()).await {
            warn!(error = %e, "OTP verification failed");
            *session = session.apply(WizardEvent::VerificationFailed)?;
            return Ok(Notice::error("Payment Failed").with_description(
                "There was an error processing your payment. Please try again.",
            ));
        }

        let completed = session.apply(WizardEvent::VerificationSucceeded { at: Utc::now() })?;
        let Some(transaction) = completed.record().cloned() else {
            return Err(StaffPayError::InternalError(
                "completed session carries no transaction record".into(),
            ));
        };
        match ledger.record(&transaction).await {
            Ok(payment) => {
                let description = format!(
                    "Payment of ${} has been processed successfully ({})",
                    payment.amount,
                    transaction.transaction_id
                );
                *session = completed;
                Ok(Notice::success("Payment Successful!").with_description(description))
            }
            Err(e) => {
                warn!(error = %e, "could not record the payment");
                *session = session.apply(WizardEvent::VerificationFailed)?;
                Ok(Notice::error("Failed to process payment"))
            }
        }
    }
}

fn intent_of(session: &WizardSession) -> Result<PaymentIntent> {
    session.intent().ok_or_else(|| {
        StaffPayError::ValidationError("The payment is missing required details".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{PaymentRecord, PaymentStatus};
    use crate::domain::ports::{PaymentGateway, PaymentStore};
    use crate::domain::seed;
    use crate::domain::wizard::{ConfirmationPhase, PaymentMethod, WizardStep};
    use crate::infrastructure::gateway::SimulatedGateway;
    use crate::infrastructure::in_memory::InMemoryStore;
    use async_trait::async_trait;
    use regex::Regex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn confirming() -> WizardSession {
        let mut session = WizardSession::open(&seed::teachers());
        for event in [
            WizardEvent::SelectTeacher("1".to_string()),
            WizardEvent::ConfirmTeacher,
            WizardEvent::SubmitDetails,
            WizardEvent::SelectMethod(PaymentMethod::Upi),
            WizardEvent::ConfirmMethod,
            WizardEvent::SelectUpi("1".to_string()),
            WizardEvent::ConfirmUpi,
        ] {
            session = session.apply(event).unwrap();
        }
        session
    }

    /// Fails the first `failures` calls of each kind, then accepts.
    #[derive(Clone, Default)]
    struct FlakyGateway {
        failures: usize,
        initiated: Arc<AtomicUsize>,
        verified: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PaymentGateway for FlakyGateway {
        async fn initiate(&self, _: &PaymentIntent) -> Result<()> {
            if self.initiated.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(StaffPayError::GatewayError("network down".to_string()));
            }
            Ok(())
        }

        async fn verify(&self, _: &PaymentIntent, _: &str) -> Result<()> {
            if self.verified.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(StaffPayError::GatewayError("declined".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_full_checkout_records_one_payment() {
        let store = InMemoryStore::new();
        let mut ledger = PaymentLedger::load(Box::new(store.clone())).await;
        let checkout = Checkout::new(Box::new(SimulatedGateway::instant()));
        let mut session = confirming();

        let notice = checkout.initiate(&mut session).await.unwrap();
        assert_eq!(notice.title, "OTP sent to your registered mobile number");
        assert!(session.otp_visible());

        session = session
            .apply(WizardEvent::EnterOtp("482913".to_string()))
            .unwrap();
        let notice = checkout.verify(&mut session, &mut ledger).await.unwrap();
        assert_eq!(notice.title, "Payment Successful!");
        assert!(session.is_complete());

        let stored: Vec<PaymentRecord> = store.load_payments().await.unwrap().unwrap();
        assert_eq!(stored.len(), 3);
        let newest = &stored[0];
        assert_eq!(newest.status, PaymentStatus::Completed);
        assert_eq!(newest.teacher_name, "John Smith");
        let txn = Regex::new(r"^TXN\d+$").unwrap();
        assert!(txn.is_match(newest.transaction_id.as_deref().unwrap()));
    }

    #[tokio::test]
    async fn test_rejected_initiation_returns_to_review() {
        let gateway = FlakyGateway {
            failures: 1,
            ..Default::default()
        };
        let checkout = Checkout::new(Box::new(gateway.clone()));
        let mut session = confirming();

        let notice = checkout.initiate(&mut session).await.unwrap();
        assert!(notice.is_error());
        assert_eq!(
            session.step(),
            &WizardStep::Confirmation(ConfirmationPhase::Review)
        );
        assert!(!session.is_processing());

        let notice = checkout.initiate(&mut session).await.unwrap();
        assert!(!notice.is_error());
        assert_eq!(gateway.initiated.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_verification_stays_on_confirmation() {
        let store = InMemoryStore::new();
        let mut ledger = PaymentLedger::load(Box::new(store.clone())).await;
        let checkout = Checkout::new(Box::new(FlakyGateway {
            failures: 1,
            ..Default::default()
        }));
        let mut session = confirming();
        // initiation also fails once
        checkout.initiate(&mut session).await.unwrap();
        checkout.initiate(&mut session).await.unwrap();
        session = session
            .apply(WizardEvent::EnterOtp("000000".to_string()))
            .unwrap();

        let notice = checkout.verify(&mut session, &mut ledger).await.unwrap();
        assert_eq!(notice.title, "Payment Failed");
        assert_eq!(session.current_step(), 6);
        assert!(!session.is_complete());
        assert!(store.load_payments().await.unwrap().is_none());

        checkout.verify(&mut session, &mut ledger).await.unwrap();
        assert!(session.is_complete());
    }

    #[tokio::test]
    async fn test_malformed_otp_is_refused_before_the_gateway() {
        let gateway = FlakyGateway::default();
        let checkout = Checkout::new(Box::new(gateway.clone()));
        let mut ledger = PaymentLedger::load(Box::new(InMemoryStore::new())).await;
        let mut session = confirming();
        checkout.initiate(&mut session).await.unwrap();
        session = session
            .apply(WizardEvent::EnterOtp("12a456".to_string()))
            .unwrap();

        assert!(checkout.verify(&mut session, &mut ledger).await.is_err());
        assert_eq!(gateway.verified.load(Ordering::SeqCst), 0);
        assert_eq!(
            session.step(),
            &WizardStep::Confirmation(ConfirmationPhase::AwaitingOtp)
        );
    }

    #[tokio::test]
    async fn test_initiate_requires_confirmation_step() {
        let checkout = Checkout::new(Box::new(SimulatedGateway::instant()));
        let mut session = WizardSession::open(&seed::teachers());
        assert!(checkout.initiate(&mut session).await.is_err());
        assert_eq!(session.current_step(), 0);
    }
}
