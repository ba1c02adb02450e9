use super::{decode_array, encode_array};
use crate::domain::payment::PaymentRecord;
use crate::domain::ports::{PAYMENTS_KEY, PaymentStore, TEACHERS_KEY, TeacherStore};
use crate::domain::teacher::Teacher;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory key-value store.
///
/// Values are held as raw JSON bytes, exactly as the persistent adapters keep
/// them, so malformed data can be planted for tests with [`put_raw`].
/// `Clone` shares the underlying map.
///
/// [`put_raw`]: InMemoryStore::put_raw
#[derive(Default, Clone)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_raw(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), bytes.into());
    }

    pub async fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().await;
        entries.get(key).cloned()
    }
}

#[async_trait]
impl TeacherStore for InMemoryStore {
    async fn load_teachers(&self) -> Result<Option<Vec<Teacher>>> {
        match self.get_raw(TEACHERS_KEY).await {
            Some(bytes) => decode_array(TEACHERS_KEY, &bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn save_teachers(&self, teachers: &[Teacher]) -> Result<()> {
        let bytes = encode_array(teachers)?;
        self.put_raw(TEACHERS_KEY, bytes).await;
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn load_payments(&self) -> Result<Option<Vec<PaymentRecord>>> {
        match self.get_raw(PAYMENTS_KEY).await {
            Some(bytes) => decode_array(PAYMENTS_KEY, &bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn save_payments(&self, payments: &[PaymentRecord]) -> Result<()> {
        let bytes = encode_array(payments)?;
        self.put_raw(PAYMENTS_KEY, bytes).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed;
    use crate::error::StaffPayError;

    #[tokio::test]
    async fn test_in_memory_teacher_store() {
        let store = InMemoryStore::new();
        assert!(store.load_teachers().await.unwrap().is_none());

        let teachers = seed::teachers();
        store.save_teachers(&teachers).await.unwrap();
        let retrieved = store.load_teachers().await.unwrap().unwrap();
        assert_eq!(retrieved, teachers);
    }

    #[tokio::test]
    async fn test_in_memory_payment_store() {
        let store = InMemoryStore::new();
        let payments = seed::payments();
        store.save_payments(&payments).await.unwrap();
        let retrieved = store.load_payments().await.unwrap().unwrap();
        assert_eq!(retrieved, payments);

        // keys are independent
        assert!(store.load_teachers().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_data_is_a_storage_error() {
        let store = InMemoryStore::new();
        store.put_raw(TEACHERS_KEY, "{not json").await;
        assert!(matches!(
            store.load_teachers().await,
            Err(StaffPayError::StorageError(_))
        ));
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.save_payments(&seed::payments()).await.unwrap();
        assert_eq!(other.load_payments().await.unwrap().unwrap().len(), 2);
    }
}
