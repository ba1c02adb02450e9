//! Application layer: the services the CLI drives.
//!
//! `TeacherRoster` and `PaymentLedger` own the in-memory record lists and
//! write them through their store ports; `Checkout` runs the asynchronous
//! confirmation phases of a wizard session against a gateway.

pub mod checkout;
pub mod dashboard;
pub mod ledger;
pub mod roster;

use crate::domain::notice::Notice;
use crate::error::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

/// Resolves what a store returned on load.
///
/// An absent key yields the seed records. Malformed or unreadable data also
/// yields the seeds, together with a notice for the user.
fn records_or_seed<T>(
    key: &str,
    loaded: Result<Option<Vec<T>>>,
    seed: impl FnOnce() -> Vec<T>,
) -> (Vec<T>, Option<Notice>) {
    match loaded {
        Ok(Some(records)) => {
            info!(key, count = records.len(), "loaded stored records");
            (records, None)
        }
        Ok(None) => {
            info!(key, "nothing stored yet, starting from seed records");
            (seed(), None)
        }
        Err(e) => {
            warn!(key, error = %e, "falling back to seed records");
            let notice = Notice::error(format!("Failed to load {key}"))
                .with_description("Showing the built-in sample records instead");
            (seed(), Some(notice))
        }
    }
}

/// An id derived from `now` in epoch millis, bumped until `taken` rejects it.
fn unique_id(now: DateTime<Utc>, taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = now.timestamp_millis();
    while taken(&candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}
