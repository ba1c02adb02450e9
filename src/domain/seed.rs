//! Built-in records used when nothing has been persisted yet, or when the
//! persisted data cannot be read.

use super::instrument::{BankAccount, CardType, RecipientAccount, UpiAccount};
use super::payment::{PaymentRecord, PaymentStatus, PaymentType};
use super::teacher::{Qualification, Teacher, TeacherStatus};
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal_macros::dec;

fn qualification(name: &str, rate: u8) -> Qualification {
    Qualification {
        name: name.to_string(),
        rate,
    }
}

pub fn teachers() -> Vec<Teacher> {
    vec![
        Teacher {
            id: "1".to_string(),
            name: "John Smith".to_string(),
            email: "john.smith@school.edu".to_string(),
            subject: "Mathematics".to_string(),
            experience: 8,
            salary: dec!(4500),
            status: TeacherStatus::Active,
            phone: "+1 234 567 8901".to_string(),
            join_date: "2020-09-15".to_string(),
            rating: 4.8,
            role: Some("Senior Teacher".to_string()),
            birthdate: Some("1985-03-15".to_string()),
            address: Some("123 Main St, City, State 12345".to_string()),
            qualifications: Some(vec![
                qualification("Master in Mathematics", 5),
                qualification("Teaching Certificate", 4),
            ]),
        },
        Teacher {
            id: "2".to_string(),
            name: "Sarah Johnson".to_string(),
            email: "sarah.johnson@school.edu".to_string(),
            subject: "English Literature".to_string(),
            experience: 12,
            salary: dec!(5200),
            status: TeacherStatus::Active,
            phone: "+1 234 567 8902".to_string(),
            join_date: "2018-08-20".to_string(),
            rating: 4.9,
            role: Some("Head Teacher".to_string()),
            birthdate: Some("1982-07-22".to_string()),
            address: Some("456 Oak Ave, City, State 12345".to_string()),
            qualifications: Some(vec![
                qualification("PhD in English Literature", 5),
                qualification("Advanced Teaching Methods", 5),
            ]),
        },
        Teacher {
            id: "3".to_string(),
            name: "Mike Brown".to_string(),
            email: "mike.brown@school.edu".to_string(),
            subject: "Physics".to_string(),
            experience: 6,
            salary: dec!(4200),
            status: TeacherStatus::Inactive,
            phone: "+1 234 567 8903".to_string(),
            join_date: "2021-01-10".to_string(),
            rating: 4.3,
            role: Some("Teacher".to_string()),
            birthdate: Some("1988-11-08".to_string()),
            address: Some("789 Pine Rd, City, State 12345".to_string()),
            qualifications: Some(vec![
                qualification("Bachelor in Physics", 4),
                qualification("Science Teaching Certificate", 4),
            ]),
        },
    ]
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

pub fn payments() -> Vec<PaymentRecord> {
    vec![
        PaymentRecord {
            id: "1".to_string(),
            teacher_id: "1".to_string(),
            teacher_name: "John Smith".to_string(),
            amount: dec!(4500),
            r#type: PaymentType::Salary,
            description: "Monthly salary - January 2024".to_string(),
            date: at(2024, 1, 15, 10, 0),
            status: PaymentStatus::Completed,
            transaction_id: Some("TXN1705320000000".to_string()),
        },
        PaymentRecord {
            id: "2".to_string(),
            teacher_id: "2".to_string(),
            teacher_name: "Sarah Johnson".to_string(),
            amount: dec!(5200),
            r#type: PaymentType::Salary,
            description: "Monthly salary - January 2024".to_string(),
            date: at(2024, 1, 14, 9, 30),
            status: PaymentStatus::Pending,
            transaction_id: None,
        },
    ]
}

pub fn bank_accounts() -> Vec<BankAccount> {
    vec![
        BankAccount {
            id: "1".to_string(),
            bank_name: "State Bank of India".to_string(),
            bank_logo: "🏦".to_string(),
            card_number: "**** **** **** 1234".to_string(),
            card_type: CardType::Debit,
            expiry_date: "12/26".to_string(),
            holder_name: "Your Name".to_string(),
        },
        BankAccount {
            id: "2".to_string(),
            bank_name: "HDFC Bank".to_string(),
            bank_logo: "🏦".to_string(),
            card_number: "**** **** **** 5678".to_string(),
            card_type: CardType::Credit,
            expiry_date: "08/27".to_string(),
            holder_name: "Your Name".to_string(),
        },
    ]
}

pub fn recipients() -> Vec<RecipientAccount> {
    vec![
        RecipientAccount {
            id: "1".to_string(),
            name: "John Doe".to_string(),
            bank_name: "ICICI Bank".to_string(),
            account_number: "****7890".to_string(),
            ifsc_code: "ICIC0001234".to_string(),
        },
        RecipientAccount {
            id: "2".to_string(),
            name: "Jane Smith".to_string(),
            bank_name: "Axis Bank".to_string(),
            account_number: "****4567".to_string(),
            ifsc_code: "UTIB0001234".to_string(),
        },
    ]
}

pub fn upi_accounts() -> Vec<UpiAccount> {
    vec![
        UpiAccount {
            id: "1".to_string(),
            upi_id: "user@paytm".to_string(),
            name: "Main Account".to_string(),
            provider: "Paytm".to_string(),
            logo: "🔵".to_string(),
            verified: true,
        },
        UpiAccount {
            id: "2".to_string(),
            upi_id: "9876543210@googlepay".to_string(),
            name: "Personal Account".to_string(),
            provider: "Google Pay".to_string(),
            logo: "🔵".to_string(),
            verified: true,
        },
    ]
}
