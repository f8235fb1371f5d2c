//! In-process datastore for tests and dry runs.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use vinadock_common::DataCard;

use crate::address::Address;
use crate::error::{DatastoreError, Result};
use crate::{checksum, encode_payload, Datastore};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub card: DataCard,
}

pub struct MemoryDataStore {
    profile: String,
    project: String,
    objects: Mutex<HashMap<String, StoredObject>>,
    downloads: AtomicUsize,
    uploads: AtomicUsize,
    drop_uploads: AtomicBool,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self {
            profile: "memory".to_string(),
            project: "docking".to_string(),
            objects: Mutex::new(HashMap::new()),
            downloads: AtomicUsize::new(0),
            uploads: AtomicUsize::new(0),
            drop_uploads: AtomicBool::new(false),
        }
    }

    /// Seed an object under `name`; returns its address.
    pub fn insert_object(&self, name: &str, bytes: &[u8], card: DataCard) -> Result<String> {
        let address = Address::new(&self.profile, &self.project, name)?.to_string();
        let mut card = card;
        card.address = address.clone();
        card.checksum = Some(checksum(bytes));
        self.objects.lock().map_err(poisoned)?.insert(
            address.clone(),
            StoredObject { bytes: bytes.to_vec(), card },
        );
        Ok(address)
    }

    /// Make every later upload report success without an address.
    pub fn drop_uploads(self) -> Self {
        self.drop_uploads.store(true, Ordering::SeqCst);
        self
    }

    pub fn get(&self, address: &str) -> Option<StoredObject> {
        self.objects.lock().ok()?.get(address).cloned()
    }

    /// Stored object at `address` decoded as JSON.
    pub fn get_json(&self, address: &str) -> Result<Value> {
        let object = self
            .get(address)
            .ok_or_else(|| DatastoreError::NotFound(address.to_string()))?;
        Ok(serde_json::from_slice(&object.bytes)?)
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    /// Number of upload calls, including dropped ones.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

impl Default for MemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> DatastoreError {
    DatastoreError::Io(std::io::Error::other("memory datastore lock poisoned"))
}

#[async_trait]
impl Datastore for MemoryDataStore {
    async fn download_object(&self, address: &str, local_path: &Path) -> Result<()> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Address::parse(address)?;

        let bytes = self
            .get(address)
            .map(|o| o.bytes)
            .ok_or_else(|| DatastoreError::NotFound(address.to_string()))?;

        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(local_path, bytes).await?;
        Ok(())
    }

    async fn upload_data_from_memory(
        &self,
        data: &Value,
        name: &str,
        card: &DataCard,
    ) -> Result<Option<String>> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let payload = encode_payload(data, &card.file_type)?;
        if self.drop_uploads.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let mut stored = card.clone();
        stored.created_at = Some(Utc::now());
        self.insert_object(name, &payload, stored).map(Some)
    }
}
