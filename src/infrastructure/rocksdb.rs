use super::{decode_array, encode_array};
use crate::domain::payment::PaymentRecord;
use crate::domain::ports::{PAYMENTS_KEY, PaymentStore, TEACHERS_KEY, TeacherStore};
use crate::domain::teacher::Teacher;
use crate::error::{Result, StaffPayError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family holding the persisted record arrays.
pub const CF_RECORDS: &str = "records";

/// A persistent store implementation using RocksDB.
///
/// Each record array is a single JSON value under its key in the `records`
/// column family, so the durable layout matches the file store.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_records = ColumnFamilyDescriptor::new(CF_RECORDS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_records])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.db.cf_handle(CF_RECORDS).ok_or_else(missing_cf)?;
        Ok(self.db.get_cf(&cf, key.as_bytes())?)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let cf = self.db.cf_handle(CF_RECORDS).ok_or_else(missing_cf)?;
        self.db.put_cf(&cf, key.as_bytes(), value)?;
        Ok(())
    }
}

fn missing_cf() -> StaffPayError {
    StaffPayError::InternalError(Box::new(std::io::Error::other(
        "Records column family not found",
    )))
}

#[async_trait]
impl TeacherStore for RocksDBStore {
    async fn load_teachers(&self) -> Result<Option<Vec<Teacher>>> {
        match self.get(TEACHERS_KEY)? {
            Some(bytes) => decode_array(TEACHERS_KEY, &bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn save_teachers(&self, teachers: &[Teacher]) -> Result<()> {
        self.put(TEACHERS_KEY, encode_array(teachers)?)
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn load_payments(&self) -> Result<Option<Vec<PaymentRecord>>> {
        match self.get(PAYMENTS_KEY)? {
            Some(bytes) => decode_array(PAYMENTS_KEY, &bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn save_payments(&self, payments: &[PaymentRecord]) -> Result<()> {
        self.put(PAYMENTS_KEY, encode_array(payments)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");
        assert!(store.db.cf_handle(CF_RECORDS).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_teacher_and_payment_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        assert!(store.load_teachers().await.unwrap().is_none());

        store.save_teachers(&seed::teachers()).await.unwrap();
        store.save_payments(&seed::payments()).await.unwrap();

        assert_eq!(store.load_teachers().await.unwrap().unwrap(), seed::teachers());
        assert_eq!(store.load_payments().await.unwrap().unwrap(), seed::payments());
    }

    #[tokio::test]
    async fn test_rocksdb_survives_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            store.save_payments(&seed::payments()[..1]).await.unwrap();
        }
        let store = RocksDBStore::open(dir.path()).unwrap();
        assert_eq!(store.load_payments().await.unwrap().unwrap().len(), 1);
    }
}
