//! vinadock-datastore — Addressable object storage.
//!
//! Objects are referenced by addresses of the form
//! `vinadock://{profile}/{project}/{name}`. Every stored object carries a
//! [`DataCard`] describing its format and content.

pub mod address;
pub mod disk;
pub mod error;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

use vinadock_common::DataCard;

pub use address::Address;
pub use disk::DiskDataStore;
pub use error::{DatastoreError, Result};
pub use memory::MemoryDataStore;

/// Storage backend trait.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Copy the object at `address` to `local_path`.
    async fn download_object(&self, address: &str, local_path: &Path) -> Result<()>;

    /// Store `data` under `name`, described by `card`.
    ///
    /// Returns the new object's address, or `None` when the backend accepted
    /// the call but did not persist anything.
    async fn upload_data_from_memory(
        &self,
        data: &Value,
        name: &str,
        card: &DataCard,
    ) -> Result<Option<String>>;
}

/// Serialize `data` into the bytes stored for `file_type`.
///
/// JSON is written as JSON; every other file type must be given a string,
/// stored verbatim.
pub(crate) fn encode_payload(data: &Value, file_type: &str) -> Result<Vec<u8>> {
    match (file_type, data) {
        ("json", _) => Ok(serde_json::to_vec(data)?),
        (_, Value::String(text)) => Ok(text.clone().into_bytes()),
        (other, _) => Err(DatastoreError::UnsupportedFileType(other.to_string())),
    }
}

/// sha256 hex digest of `bytes`.
pub(crate) fn checksum(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
