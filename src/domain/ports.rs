use super::payment::PaymentRecord;
use super::teacher::Teacher;
use super::wizard::PaymentIntent;
use crate::error::Result;
use async_trait::async_trait;

/// Key under which the teacher array is persisted.
pub const TEACHERS_KEY: &str = "teachers";
/// Key under which the payment array is persisted.
pub const PAYMENTS_KEY: &str = "payments";

#[async_trait]
pub trait TeacherStore: Send + Sync {
    /// Returns `None` when nothing has been persisted under the key yet.
    async fn load_teachers(&self) -> Result<Option<Vec<Teacher>>>;
    async fn save_teachers(&self, teachers: &[Teacher]) -> Result<()>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Returns `None` when nothing has been persisted under the key yet.
    async fn load_payments(&self) -> Result<Option<Vec<PaymentRecord>>>;
    async fn save_payments(&self, payments: &[PaymentRecord]) -> Result<()>;
}

/// Stand-in for a payment network. Both calls either succeed or report why not.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(&self, intent: &PaymentIntent) -> Result<()>;
    async fn verify(&self, intent: &PaymentIntent, otp: &str) -> Result<()>;
}

pub type TeacherStoreBox = Box<dyn TeacherStore>;
pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
