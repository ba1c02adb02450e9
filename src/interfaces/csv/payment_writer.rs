use crate::domain::payment::{PaymentRecord, PaymentStatus, PaymentType};
use crate::error::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct PaymentRow<'a> {
    id: &'a str,
    date: DateTime<Utc>,
    teacher_id: &'a str,
    teacher: &'a str,
    #[serde(rename = "type")]
    r#type: PaymentType,
    amount: Decimal,
    status: PaymentStatus,
    transaction_id: &'a str,
    description: &'a str,
}

impl<'a> From<&'a PaymentRecord> for PaymentRow<'a> {
    fn from(record: &'a PaymentRecord) -> Self {
        PaymentRow {
            id: &record.id,
            date: record.date,
            teacher_id: &record.teacher_id,
            teacher: &record.teacher_name,
            r#type: record.r#type,
            amount: record.amount,
            status: record.status,
            transaction_id: record.transaction_id.as_deref().unwrap_or(""),
            description: &record.description,
        }
    }
}

/// Writes payment records as CSV, one row per record.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_payments<'a>(
        &mut self,
        payments: impl IntoIterator<Item = &'a PaymentRecord>,
    ) -> Result<()> {
        for payment in payments {
            self.writer.serialize(PaymentRow::from(payment))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
