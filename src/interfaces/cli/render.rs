//! Plain-text rendering for the terminal. Data goes to the given writer,
//! notices go to stderr.

use crate::application::dashboard::{PaymentStats, TeacherStats};
use crate::domain::notice::{Notice, NoticeLevel};
use crate::domain::payment::PaymentRecord;
use crate::domain::teacher::Teacher;
use crate::domain::wizard::{Instrument, PaymentIntent, TransactionRecord};
use rust_decimal::Decimal;
use std::io::{self, Write};

pub fn notice(notice: &Notice) {
    let marker = match notice.level {
        NoticeLevel::Success => "✓",
        NoticeLevel::Info => "i",
        NoticeLevel::Error => "✗",
    };
    eprintln!("{marker} {notice}");
}

/// Formats an amount as dollars with thousands separators.
pub fn money(amount: Decimal) -> String {
    let rounded = amount.round_dp(2).normalize();
    let text = rounded.abs().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}${grouped}.{fraction:0<2}"),
        None => format!("{sign}${grouped}"),
    }
}

pub fn teachers<W: Write>(out: &mut W, teachers: &[&Teacher]) -> io::Result<()> {
    if teachers.is_empty() {
        return writeln!(out, "No teachers found");
    }
    writeln!(
        out,
        "{:<15} {:<22} {:<20} {:<18} {:<9} {:>10} {:>6}",
        "ID", "NAME", "SUBJECT", "ROLE", "STATUS", "SALARY", "RATING"
    )?;
    for t in teachers {
        writeln!(
            out,
            "{:<15} {:<22} {:<20} {:<18} {:<9} {:>10} {:>6.1}",
            t.id,
            t.name,
            t.subject,
            t.role.as_deref().unwrap_or("-"),
            t.status.to_string(),
            money(t.salary),
            t.rating
        )?;
    }
    Ok(())
}

pub fn payments<W: Write>(out: &mut W, payments: &[&PaymentRecord]) -> io::Result<()> {
    if payments.is_empty() {
        return writeln!(out, "No payments found");
    }
    writeln!(
        out,
        "{:<15} {:<10} {:<22} {:<9} {:>10} {:<9} {:<16}",
        "ID", "DATE", "TEACHER", "TYPE", "AMOUNT", "STATUS", "TRANSACTION"
    )?;
    for p in payments {
        writeln!(
            out,
            "{:<15} {:<10} {:<22} {:<9} {:>10} {:<9} {:<16}",
            p.id,
            p.date.format("%Y-%m-%d").to_string(),
            p.teacher_name,
            p.r#type.to_string(),
            money(p.signed_amount()),
            p.status.to_string(),
            p.transaction_id.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

pub fn payment_details<W: Write>(out: &mut W, payment: &PaymentRecord) -> io::Result<()> {
    writeln!(out, "Transaction Details:")?;
    writeln!(
        out,
        "  Transaction ID: {}",
        payment.transaction_id.as_deref().unwrap_or("N/A")
    )?;
    writeln!(out, "  Teacher: {}", payment.teacher_name)?;
    writeln!(out, "  Amount: {}", money(payment.amount))?;
    writeln!(out, "  Type: {}", payment.r#type)?;
    writeln!(out, "  Status: {}", payment.status)?;
    writeln!(out, "  Date: {}", payment.date.format("%Y-%m-%d %H:%M UTC"))?;
    if !payment.description.is_empty() {
        writeln!(out, "  Description: {}", payment.description)?;
    }
    Ok(())
}

pub fn dashboard<W: Write>(
    out: &mut W,
    teachers: &TeacherStats,
    payments: &PaymentStats,
    recent: &[&PaymentRecord],
) -> io::Result<()> {
    writeln!(out, "Dashboard")?;
    writeln!(out, "  Total teachers:   {}", teachers.total_teachers)?;
    match teachers.active_rate {
        Some(rate) => writeln!(
            out,
            "  Active teachers:  {} ({rate}% active rate)",
            teachers.active_teachers
        )?,
        None => writeln!(out, "  Active teachers:  0 (No teachers yet)")?,
    }
    write!(
        out,
        "  Monthly expense:  {}",
        money(teachers.total_salary_expense)
    )?;
    match teachers.average_salary {
        Some(average) => writeln!(out, " ({} avg per teacher)", money(average))?,
        None => writeln!(out)?,
    }
    writeln!(
        out,
        "  Average rating:   {:.1} ({})",
        teachers.average_rating,
        teachers.rating_label()
    )?;
    writeln!(out)?;
    writeln!(out, "Payments")?;
    writeln!(
        out,
        "  Total paid:       {} ({} completed)",
        money(payments.total_paid),
        payments.completed_count
    )?;
    writeln!(
        out,
        "  Pending:          {} ({} pending)",
        money(payments.pending_amount),
        payments.pending_count
    )?;
    writeln!(
        out,
        "  This month:       {} ({})",
        payments.this_month_count,
        money(payments.this_month_amount)
    )?;
    writeln!(out, "  Success rate:     {}%", payments.success_rate)?;
    writeln!(out)?;
    writeln!(out, "Recent payments")?;
    if recent.is_empty() {
        writeln!(out, "  No payments yet")?;
    }
    for p in recent {
        writeln!(
            out,
            "  {}  {:<22} {:>10}  {}",
            p.date.format("%Y-%m-%d"),
            p.teacher_name,
            money(p.amount),
            p.r#type
        )?;
    }
    Ok(())
}

/// The summary shown before the payment is initiated.
pub fn review<W: Write>(out: &mut W, intent: &PaymentIntent, description: &str) -> io::Result<()> {
    writeln!(out, "Payment summary")?;
    writeln!(out, "  Teacher: {}", intent.teacher_name)?;
    writeln!(out, "  Amount:  {}", money(intent.amount.value()))?;
    writeln!(out, "  Type:    {}", intent.r#type)?;
    if !description.is_empty() {
        writeln!(out, "  Note:    {description}")?;
    }
    match &intent.instrument {
        Instrument::Upi(upi) => writeln!(out, "  Via:     UPI {} ({})", upi.upi_id, upi.provider)?,
        Instrument::Card { card, recipient } => {
            writeln!(
                out,
                "  Via:     {} card {} ({})",
                card.card_type, card.card_number, card.bank_name
            )?;
            writeln!(
                out,
                "  To:      {} {} ({})",
                recipient.name, recipient.account_number, recipient.bank_name
            )?;
        }
        Instrument::NetBanking { recipient } => {
            writeln!(
                out,
                "  Via:     net banking to {} {} ({})",
                recipient.name, recipient.account_number, recipient.bank_name
            )?;
        }
    }
    Ok(())
}

pub fn receipt<W: Write>(out: &mut W, record: &TransactionRecord) -> io::Result<()> {
    writeln!(out, "Payment completed")?;
    writeln!(out, "  Transaction ID: {}", record.transaction_id)?;
    writeln!(out, "  Teacher: {}", record.teacher.name)?;
    writeln!(out, "  Amount: {}", money(record.payment_data.amount))?;
    writeln!(out, "  Method: {}", record.method)?;
    writeln!(out, "  Timestamp: {}", record.timestamp.to_rfc3339())?;
    Ok(())
}
