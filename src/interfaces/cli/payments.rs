use super::{Context, print_json, render};
use crate::application::dashboard::PaymentStats;
use crate::domain::payment::{PaymentFilter, PaymentStatus, PaymentType};
use crate::error::{Result, StaffPayError};
use crate::interfaces::csv::payment_writer::PaymentWriter;
use chrono::Utc;
use clap::{Args, Subcommand};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum PaymentCommand {
    /// List payments, newest first.
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Also print the payment statistics.
        #[arg(long)]
        stats: bool,
    },
    /// Show the details of one payment.
    Show { id: String },
    /// Write payments as CSV.
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output file; defaults to stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Matches teacher name, description or transaction id.
    #[arg(long, short)]
    pub search: Option<String>,
    /// `all`, `completed`, `pending` or `failed`.
    #[arg(long, default_value = "all")]
    pub status: String,
    /// `all`, `salary`, `bonus` or `deduction`.
    #[arg(long = "type", default_value = "all")]
    pub r#type: String,
}

impl FilterArgs {
    fn to_filter(&self) -> Result<PaymentFilter> {
        Ok(PaymentFilter {
            search: self.search.clone().unwrap_or_default(),
            status: parse_or_all::<PaymentStatus>(&self.status)?,
            r#type: parse_or_all::<PaymentType>(&self.r#type)?,
        })
    }
}

fn parse_or_all<T>(raw: &str) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = StaffPayError>,
{
    if raw.trim().eq_ignore_ascii_case("all") {
        Ok(None)
    } else {
        raw.parse().map(Some)
    }
}

pub fn run<W: Write>(cmd: PaymentCommand, ctx: &Context, out: &mut W) -> Result<()> {
    match cmd {
        PaymentCommand::List { filter, stats } => {
            let payments = ctx.ledger.filter(&filter.to_filter()?);
            if ctx.json {
                return print_json(out, &payments);
            }
            render::payments(out, &payments)?;
            if stats {
                let stats = PaymentStats::from_payments(ctx.ledger.payments(), Utc::now());
                writeln!(out)?;
                writeln!(out, "Total paid:   {}", render::money(stats.total_paid))?;
                writeln!(out, "Pending:      {}", render::money(stats.pending_amount))?;
                writeln!(out, "This month:   {}", stats.this_month_count)?;
                writeln!(out, "Success rate: {}%", stats.success_rate)?;
            }
            Ok(())
        }
        PaymentCommand::Show { id } => {
            let payment = ctx
                .ledger
                .get(&id)
                .ok_or_else(|| StaffPayError::NotFound(format!("Payment '{id}' not found")))?;
            if ctx.json {
                print_json(out, payment)
            } else {
                render::payment_details(out, payment)?;
                Ok(())
            }
        }
        PaymentCommand::Export { filter, output } => {
            let payments = ctx.ledger.filter(&filter.to_filter()?);
            match output {
                Some(path) => PaymentWriter::new(File::create(path)?).write_payments(payments),
                None => PaymentWriter::new(out).write_payments(payments),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_args() {
        let args = FilterArgs {
            search: Some("smith".to_string()),
            status: "Completed".to_string(),
            r#type: "all".to_string(),
        };
        let filter = args.to_filter().unwrap();
        assert_eq!(filter.search, "smith");
        assert_eq!(filter.status, Some(PaymentStatus::Completed));
        assert_eq!(filter.r#type, None);

        let bad = FilterArgs {
            status: "refunded".to_string(),
            r#type: "all".to_string(),
            ..Default::default()
        };
        assert!(bad.to_filter().is_err());
    }
}
