//! Adapters for the domain ports.
//!
//! Every store keeps the two record arrays as JSON documents under the
//! `teachers` and `payments` keys, so data written by one adapter reads the
//! same way through another.

pub mod gateway;
pub mod in_memory;
pub mod json_file;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

use crate::error::{Result, StaffPayError};
use serde::Serialize;
use serde::de::DeserializeOwned;

fn decode_array<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<Vec<T>> {
    serde_json::from_slice(bytes)
        .map_err(|e| StaffPayError::StorageError(format!("Malformed '{key}' data: {e}")))
}

fn encode_array<T: Serialize>(items: &[T]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(items)?)
}
