use super::{decode_array, encode_array};
use crate::domain::payment::PaymentRecord;
use crate::domain::ports::{PAYMENTS_KEY, PaymentStore, TEACHERS_KEY, TeacherStore};
use crate::domain::teacher::Teacher;
use crate::error::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A persistent store keeping one `<key>.json` file per key in a directory.
///
/// Writes go to a sibling temporary file first and are renamed into place, so
/// a crash mid-write leaves the previous document intact.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens the store rooted at `dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let target = self.path_for(key);
        let staging = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, &target).await?;
        Ok(())
    }
}

#[async_trait]
impl TeacherStore for JsonFileStore {
    async fn load_teachers(&self) -> Result<Option<Vec<Teacher>>> {
        match self.read(TEACHERS_KEY).await? {
            Some(bytes) => decode_array(TEACHERS_KEY, &bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn save_teachers(&self, teachers: &[Teacher]) -> Result<()> {
        self.write(TEACHERS_KEY, encode_array(teachers)?).await
    }
}

#[async_trait]
impl PaymentStore for JsonFileStore {
    async fn load_payments(&self) -> Result<Option<Vec<PaymentRecord>>> {
        match self.read(PAYMENTS_KEY).await? {
            Some(bytes) => decode_array(PAYMENTS_KEY, &bytes).map(Some),
            None => Ok(None),
        }
    }

    async fn save_payments(&self, payments: &[PaymentRecord]) -> Result<()> {
        self.write(PAYMENTS_KEY, encode_array(payments)?).await
    }
}
