use crate::domain::ports::PaymentGateway;
use crate::domain::wizard::{PaymentIntent, is_valid_otp};
use crate::error::{Result, StaffPayError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

pub const DEFAULT_GATEWAY_DELAY: Duration = Duration::from_millis(2000);

/// A gateway that waits a fixed delay and then accepts.
///
/// Any well-formed OTP verifies; there is no network behind it.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// A gateway that answers immediately.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_DELAY)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn initiate(&self, intent: &PaymentIntent) -> Result<()> {
        debug!(
            teacher = %intent.teacher_id,
            amount = %intent.amount,
            "simulating payment initiation"
        );
        sleep(self.delay).await;
        Ok(())
    }

    async fn verify(&self, intent: &PaymentIntent, otp: &str) -> Result<()> {
        debug!(teacher = %intent.teacher_id, "simulating OTP verification");
        sleep(self.delay).await;
        if is_valid_otp(otp) {
            Ok(())
        } else {
            Err(StaffPayError::GatewayError("OTP rejected".to_string()))
        }
    }
}
