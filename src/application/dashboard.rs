//! Aggregates shown on the dashboard and the payments page. Recomputed from
//! the current lists on every read.

use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::domain::teacher::{DEFAULT_RATING, Teacher};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

const RECENT_PAYMENTS: usize = 3;

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeacherStats {
    pub total_teachers: usize,
    pub active_teachers: usize,
    /// Rounded percentage of active teachers, `None` without any teacher.
    pub active_rate: Option<u32>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_salary_expense: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub average_salary: Option<Decimal>,
    pub average_rating: f64,
}

impl TeacherStats {
    pub fn from_teachers(teachers: &[Teacher]) -> Self {
        let active: Vec<&Teacher> = teachers.iter().filter(|t| t.is_active()).collect();
        let total_salary_expense: Decimal = active.iter().map(|t| t.salary).sum();
        let average_salary = (!active.is_empty()).then(|| {
            (total_salary_expense / Decimal::from(active.len()))
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        });
        let average_rating = if teachers.is_empty() {
            0.0
        } else {
            let sum: f64 = teachers
                .iter()
                .map(|t| if t.rating > 0.0 { t.rating } else { DEFAULT_RATING })
                .sum();
            (sum / teachers.len() as f64 * 10.0).round() / 10.0
        };
        Self {
            total_teachers: teachers.len(),
            active_teachers: active.len(),
            active_rate: percent(active.len(), teachers.len()),
            total_salary_expense,
            average_salary,
            average_rating,
        }
    }

    pub fn rating_label(&self) -> &'static str {
        if self.average_rating >= 4.5 {
            "Excellent"
        } else if self.average_rating >= 4.0 {
            "Good"
        } else if self.average_rating > 0.0 {
            "Room for improvement"
        } else {
            "No ratings yet"
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStats {
    /// Completed payments, deductions counted negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid: Decimal,
    pub completed_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub pending_amount: Decimal,
    pub pending_count: usize,
    pub this_month_count: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub this_month_amount: Decimal,
    pub success_rate: u32,
}

impl PaymentStats {
    /// Computes the figures, with "this month" taken relative to `now`.
    pub fn from_payments(payments: &[PaymentRecord], now: DateTime<Utc>) -> Self {
        let completed: Vec<&PaymentRecord> = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Completed)
            .collect();
        let pending: Vec<&PaymentRecord> = payments
            .iter()
            .filter(|p| p.status == PaymentStatus::Pending)
            .collect();
        let this_month: Vec<&PaymentRecord> = payments
            .iter()
            .filter(|p| p.date.year() == now.year() && p.date.month() == now.month())
            .collect();
        Self {
            total_paid: completed.iter().map(|p| p.signed_amount()).sum(),
            completed_count: completed.len(),
            pending_amount: pending.iter().map(|p| p.amount).sum(),
            pending_count: pending.len(),
            this_month_count: this_month.len(),
            this_month_amount: this_month.iter().map(|p| p.amount).sum(),
            success_rate: percent(completed.len(), payments.len()).unwrap_or(0),
        }
    }
}

/// The latest completed payments, in ledger order.
pub fn recent_payments(payments: &[PaymentRecord]) -> Vec<&PaymentRecord> {
    payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Completed)
        .take(RECENT_PAYMENTS)
        .collect()
}

fn percent(part: usize, whole: usize) -> Option<u32> {
    (whole > 0).then(|| (part as f64 / whole as f64 * 100.0).round() as u32)
}
