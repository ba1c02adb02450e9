//! The `staffpay` command line.

pub mod pay;
pub mod payments;
pub mod render;
pub mod teachers;

use crate::application::checkout::Checkout;
use crate::application::dashboard::{PaymentStats, TeacherStats, recent_payments};
use crate::application::ledger::PaymentLedger;
use crate::application::roster::TeacherRoster;
use crate::domain::payment::PaymentRecord;
use crate::domain::ports::{PaymentStoreBox, TeacherStoreBox};
use crate::error::Result;
use crate::infrastructure::gateway::SimulatedGateway;
use crate::infrastructure::in_memory::InMemoryStore;
use crate::infrastructure::json_file::JsonFileStore;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(author, version, about = "Teacher payroll administration", long_about = None)]
pub struct Cli {
    /// Directory holding `teachers.json` and `payments.json`.
    #[arg(long, global = true, env = "STAFFPAY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Simulated payment gateway latency in milliseconds.
    #[arg(long, global = true, default_value_t = 2000, env = "STAFFPAY_GATEWAY_DELAY_MS")]
    pub gateway_delay_ms: u64,

    /// Simulated add-teacher submit latency in milliseconds.
    #[arg(long, global = true, default_value_t = 1500, env = "STAFFPAY_SUBMIT_DELAY_MS")]
    pub submit_delay_ms: u64,

    /// Print results as JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Staff and payment overview.
    Dashboard,
    /// Manage the teacher roster.
    #[command(subcommand)]
    Teachers(teachers::TeacherCommand),
    /// Browse the payment history.
    #[command(subcommand)]
    Payments(payments::PaymentCommand),
    /// Pay a teacher through the payment wizard.
    Pay(pay::PayArgs),
}

/// The loaded services and output options a subcommand runs against.
pub struct Context {
    pub roster: TeacherRoster,
    pub ledger: PaymentLedger,
    pub checkout: Checkout,
    pub json: bool,
}

pub async fn run(cli: Cli) -> Result<()> {
    let (teacher_store, payment_store) = open_stores(&cli)?;

    let roster = TeacherRoster::load(teacher_store)
        .await
        .with_submit_delay(Duration::from_millis(cli.submit_delay_ms));
    let ledger = PaymentLedger::load(payment_store).await;
    for notice in roster.notice().into_iter().chain(ledger.notice()) {
        render::notice(notice);
    }

    let gateway = SimulatedGateway::new(Duration::from_millis(cli.gateway_delay_ms));
    let mut ctx = Context {
        roster,
        ledger,
        checkout: Checkout::new(Box::new(gateway)),
        json: cli.json,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Dashboard => dashboard(&ctx, &mut out),
        Command::Teachers(cmd) => teachers::run(cmd, &mut ctx, &mut out).await,
        Command::Payments(cmd) => payments::run(cmd, &ctx, &mut out),
        Command::Pay(args) => pay::run(args, &mut ctx, &mut out).await,
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardView<'a> {
    teachers: TeacherStats,
    rating_label: &'static str,
    payments: PaymentStats,
    recent_payments: Vec<&'a PaymentRecord>,
}

fn dashboard<W: Write>(ctx: &Context, out: &mut W) -> Result<()> {
    let teachers = TeacherStats::from_teachers(ctx.roster.teachers());
    let payments = PaymentStats::from_payments(ctx.ledger.payments(), Utc::now());
    let recent = recent_payments(ctx.ledger.payments());
    if ctx.json {
        let view = DashboardView {
            rating_label: teachers.rating_label(),
            teachers,
            payments,
            recent_payments: recent,
        };
        print_json(out, &view)
    } else {
        render::dashboard(out, &teachers, &payments, &recent)?;
        Ok(())
    }
}

pub(crate) fn print_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn open_stores(cli: &Cli) -> Result<(TeacherStoreBox, PaymentStoreBox)> {
    if let Some(db_path) = &cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        {
            use crate::infrastructure::rocksdb::RocksDBStore;

            debug!(path = %db_path.display(), "opening RocksDB store");
            let store = RocksDBStore::open(db_path)?;
            return Ok((Box::new(store.clone()), Box::new(store)));
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        {
            let fallback = if cli.data_dir.is_some() {
                "JSON file"
            } else {
                "In-Memory"
            };
            tracing::warn!(path = %db_path.display(), "storage-rocksdb feature is not enabled");
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to {fallback} storage."
            );
        }
    }

    if let Some(dir) = &cli.data_dir {
        debug!(dir = %dir.display(), "opening JSON file store");
        let store = JsonFileStore::open(dir)?;
        Ok((Box::new(store.clone()), Box::new(store)))
    } else {
        debug!("using in-memory store");
        let store = InMemoryStore::new();
        Ok((Box::new(store.clone()), Box::new(store)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "staffpay",
            "teachers",
            "list",
            "--search",
            "math",
            "--data-dir",
            "/tmp/staffpay",
            "--gateway-delay-ms",
            "0",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/staffpay")));
        assert_eq!(cli.gateway_delay_ms, 0);
        let Command::Teachers(teachers::TeacherCommand::List { search, .. }) = cli.command else {
            panic!("expected teachers list");
        };
        assert_eq!(search.as_deref(), Some("math"));
    }

    #[test]
    fn test_cli_rejects_unknown_method() {
        let parsed = Cli::try_parse_from([
            "staffpay", "pay", "--teacher", "1", "--method", "cheque", "--otp", "123456",
        ]);
        assert!(parsed.is_err());
    }
}
