use crate::error::{Result, StaffPayError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A strictly positive payment amount.
///
/// The wizard's draft holds a raw `Decimal` while the user edits it; the value
/// only becomes an `Amount` once the details step accepts it.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(StaffPayError::ValidationError(
                "Please enter a valid payment amount".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = StaffPayError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    #[default]
    Salary,
    Bonus,
    Deduction,
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Salary => write!(f, "salary"),
            Self::Bonus => write!(f, "bonus"),
            Self::Deduction => write!(f, "deduction"),
        }
    }
}

impl std::str::FromStr for PaymentType {
    type Err = StaffPayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "salary" => Ok(Self::Salary),
            "bonus" => Ok(Self::Bonus),
            "deduction" => Ok(Self::Deduction),
            other => Err(StaffPayError::ValidationError(format!(
                "Unknown payment type '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    #[default]
    Pending,
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Pending => write!(f, "pending"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = StaffPayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "completed" => Ok(Self::Completed),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            other => Err(StaffPayError::ValidationError(format!(
                "Unknown payment status '{other}'"
            ))),
        }
    }
}

/// A payment as persisted under the `payments` key. Never mutated once stored.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: String,
    pub teacher_id: String,
    pub teacher_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub r#type: PaymentType,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl PaymentRecord {
    /// Contribution of this record to the "total paid" figure.
    pub fn signed_amount(&self) -> Decimal {
        match self.r#type {
            PaymentType::Deduction => -self.amount,
            _ => self.amount,
        }
    }
}

/// The wizard's in-progress payment details.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    #[serde(rename = "type")]
    pub r#type: PaymentType,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub status: PaymentStatus,
}

impl Default for PaymentDraft {
    fn default() -> Self {
        Self {
            r#type: PaymentType::Salary,
            amount: Decimal::ZERO,
            description: String::new(),
            status: PaymentStatus::Pending,
        }
    }
}

/// Search and filter criteria for the payments list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilter {
    pub search: String,
    pub status: Option<PaymentStatus>,
    pub r#type: Option<PaymentType>,
}

impl PaymentFilter {
    pub fn matches(&self, record: &PaymentRecord) -> bool {
        let term = self.search.to_lowercase();
        let matches_search = record.teacher_name.to_lowercase().contains(&term)
            || record.description.to_lowercase().contains(&term)
            || record
                .transaction_id
                .as_ref()
                .is_some_and(|id| id.to_lowercase().contains(&term));
        let matches_status = self.status.is_none_or(|status| record.status == status);
        let matches_type = self.r#type.is_none_or(|kind| record.r#type == kind);
        matches_search && matches_status && matches_type
    }
}
