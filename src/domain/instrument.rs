//! Payment instruments offered during a wizard session: cards, bank
//! recipients and UPI handles, plus the sub-forms that add new ones.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

static UPI_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+$").expect("valid UPI pattern"));

pub const INDIAN_BANKS: [&str; 10] = [
    "State Bank of India",
    "HDFC Bank",
    "ICICI Bank",
    "Punjab National Bank",
    "Canara Bank",
    "Union Bank of India",
    "Bank of Baroda",
    "Indian Bank",
    "Central Bank of India",
    "Axis Bank",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpiProvider {
    pub name: &'static str,
    pub logo: &'static str,
}

pub const UPI_PROVIDERS: [UpiProvider; 8] = [
    UpiProvider {
        name: "Google Pay",
        logo: "🔵",
    },
    UpiProvider {
        name: "PhonePe",
        logo: "🟣",
    },
    UpiProvider {
        name: "Paytm",
        logo: "🔵",
    },
    UpiProvider {
        name: "Amazon Pay",
        logo: "🟠",
    },
    UpiProvider {
        name: "BHIM",
        logo: "🔴",
    },
    UpiProvider {
        name: "WhatsApp Pay",
        logo: "🟢",
    },
    UpiProvider {
        name: "MobiKwik",
        logo: "🔵",
    },
    UpiProvider {
        name: "Freecharge",
        logo: "🟡",
    },
];

const FALLBACK_UPI_LOGO: &str = "💳";
const BANK_LOGO: &str = "🏦";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InstrumentError {
    #[error("Please fill all required fields")]
    MissingFields,
    #[error("Please enter a valid UPI ID (e.g., user@provider)")]
    InvalidUpiId,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    #[default]
    Debit,
    Credit,
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debit => write!(f, "DEBIT"),
            Self::Credit => write!(f, "CREDIT"),
        }
    }
}

/// A debit or credit card the payment is drawn from.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: String,
    pub bank_name: String,
    pub bank_logo: String,
    pub card_number: String,
    pub card_type: CardType,
    pub expiry_date: String,
    pub holder_name: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecipientAccount {
    pub id: String,
    pub name: String,
    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpiAccount {
    pub id: String,
    pub upi_id: String,
    pub name: String,
    pub provider: String,
    pub logo: String,
    pub verified: bool,
}

/// Card sub-form. The CVV and ZIP are checked for presence only and never kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCard {
    pub bank_name: String,
    pub card_number: String,
    pub card_type: CardType,
    pub expiry_date: String,
    pub cvv: String,
    pub zip_code: String,
    pub holder_name: String,
}

impl NewCard {
    pub fn into_account(self, id: String) -> Result<BankAccount, InstrumentError> {
        require(&[
            &self.bank_name,
            &self.card_number,
            &self.expiry_date,
            &self.cvv,
            &self.holder_name,
        ])?;
        Ok(BankAccount {
            id,
            bank_name: self.bank_name,
            bank_logo: BANK_LOGO.to_string(),
            card_number: format!("**** **** **** {}", last_four(&self.card_number)),
            card_type: self.card_type,
            expiry_date: self.expiry_date,
            holder_name: self.holder_name,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecipient {
    pub name: String,
    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
}

impl NewRecipient {
    pub fn into_account(self, id: String) -> Result<RecipientAccount, InstrumentError> {
        require(&[
            &self.name,
            &self.bank_name,
            &self.account_number,
            &self.ifsc_code,
        ])?;
        Ok(RecipientAccount {
            id,
            name: self.name,
            bank_name: self.bank_name,
            account_number: format!("****{}", last_four(&self.account_number)),
            ifsc_code: self.ifsc_code,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUpi {
    pub upi_id: String,
    pub name: String,
    pub provider: String,
}

impl NewUpi {
    pub fn into_account(self, id: String) -> Result<UpiAccount, InstrumentError> {
        require(&[&self.upi_id, &self.name, &self.provider])?;
        if !is_valid_upi_id(&self.upi_id) {
            return Err(InstrumentError::InvalidUpiId);
        }
        let logo = UPI_PROVIDERS
            .iter()
            .find(|p| p.name == self.provider)
            .map_or(FALLBACK_UPI_LOGO, |p| p.logo);
        Ok(UpiAccount {
            id,
            upi_id: self.upi_id,
            name: self.name,
            provider: self.provider,
            logo: logo.to_string(),
            // no real verification happens
            verified: true,
        })
    }
}

/// Checks the `local@provider` shape of a UPI handle.
pub fn is_valid_upi_id(upi_id: &str) -> bool {
    UPI_ID_PATTERN.is_match(upi_id)
}

/// The account a simulated QR scan resolves to.
pub fn scanned_upi_account(id: String) -> UpiAccount {
    UpiAccount {
        id,
        upi_id: "teacher@paytm".to_string(),
        name: "Teacher Account".to_string(),
        provider: "Paytm".to_string(),
        logo: "🔵".to_string(),
        verified: true,
    }
}

fn require(fields: &[&String]) -> Result<(), InstrumentError> {
    if fields.iter().any(|field| field.trim().is_empty()) {
        Err(InstrumentError::MissingFields)
    } else {
        Ok(())
    }
}

fn last_four(number: &str) -> String {
    let chars: Vec<char> = number.chars().filter(|c| !c.is_whitespace()).collect();
    let start = chars.len().saturating_sub(4);
    chars[start..].iter().collect()
}
