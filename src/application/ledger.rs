use super::{records_or_seed, unique_id};
use crate::domain::notice::Notice;
use crate::domain::payment::{PaymentFilter, PaymentRecord};
use crate::domain::ports::{PAYMENTS_KEY, PaymentStoreBox};
use crate::domain::seed;
use crate::domain::wizard::TransactionRecord;
use crate::error::Result;
use tracing::info;

/// The payment history, newest first.
pub struct PaymentLedger {
    store: PaymentStoreBox,
    payments: Vec<PaymentRecord>,
    notice: Option<Notice>,
}

impl PaymentLedger {
    /// Loads the ledger, falling back to the seed payments when the stored
    /// data is unusable.
    pub async fn load(store: PaymentStoreBox) -> Self {
        let loaded = store.load_payments().await;
        let (mut payments, notice) = records_or_seed(PAYMENTS_KEY, loaded, seed::payments);
        payments.sort_by(|a, b| b.date.cmp(&a.date));
        Self {
            store,
            payments,
            notice,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    pub fn get(&self, id: &str) -> Option<&PaymentRecord> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub fn filter(&self, filter: &PaymentFilter) -> Vec<&PaymentRecord> {
        self.payments.iter().filter(|p| filter.matches(p)).collect()
    }

    /// Prepends `payment` and persists the whole ledger.
    pub async fn add(&mut self, payment: PaymentRecord) -> Result<()> {
        let mut payments = Vec::with_capacity(self.payments.len() + 1);
        payments.push(payment);
        payments.extend(self.payments.iter().cloned());
        self.store.save_payments(&payments).await?;
        self.payments = payments;
        Ok(())
    }

    /// Appends the record a completed wizard session emitted.
    pub async fn record(&mut self, transaction: &TransactionRecord) -> Result<PaymentRecord> {
        let id = unique_id(transaction.timestamp, |id| self.get(id).is_some());
        let payment = transaction.to_payment_record(id);
        self.add(payment.clone()).await?;
        info!(
            id = %payment.id,
            transaction_id = %transaction.transaction_id,
            teacher = %payment.teacher_name,
            amount = %payment.amount,
            "payment recorded"
        );
        Ok(payment)
    }
}
