//! Disk-backed datastore.
//!
//! Layout: `root/{profile}/{project}/{name}` holds the object bytes and
//! `root/{profile}/{project}/{name}.cdc` holds its JSON card.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use vinadock_common::DataCard;
use vinadock_config::DatastoreConfig;

use crate::address::Address;
use crate::error::{DatastoreError, Result};
use crate::{checksum, encode_payload, Datastore};

const CARD_SUFFIX: &str = ".cdc";
const STAGING_SUFFIX: &str = ".partial";

/// Sibling of `path` used while an upload is in flight.
fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(STAGING_SUFFIX);
    PathBuf::from(staged)
}

pub struct DiskDataStore {
    root: PathBuf,
    profile: String,
    project: String,
}

impl DiskDataStore {
    pub fn new<P: AsRef<Path>>(root: P, profile: &str, project: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            profile: profile.to_string(),
            project: project.to_string(),
        }
    }

    pub fn from_config(config: &DatastoreConfig) -> Self {
        Self::new(&config.root, &config.profile, &config.project)
    }

    fn object_path(&self, address: &Address) -> PathBuf {
        self.root
            .join(&address.profile)
            .join(&address.project)
            .join(&address.name)
    }

    fn card_path(&self, address: &Address) -> PathBuf {
        let mut path = self.object_path(address).into_os_string();
        path.push(CARD_SUFFIX);
        PathBuf::from(path)
    }

    /// Read the card stored next to the object at `address`.
    pub async fn get_card(&self, address: &str) -> Result<DataCard> {
        let parsed = Address::parse(address)?;
        let path = self.card_path(&parsed);
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DatastoreError::NotFound(address.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&raw)?)
    }
}

#[async_trait]
impl Datastore for DiskDataStore {
    async fn download_object(&self, address: &str, local_path: &Path) -> Result<()> {
        let parsed = Address::parse(address)?;
        let source = self.object_path(&parsed);

        if !fs::try_exists(&source).await? {
            return Err(DatastoreError::NotFound(address.to_string()));
        }

        if let Some(parent) = local_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = fs::copy(&source, local_path).await?;
        debug!("Downloaded {} ({} bytes) to {:?}", address, bytes, local_path);
        Ok(())
    }

    async fn upload_data_from_memory(
        &self,
        data: &Value,
        name: &str,
        card: &DataCard,
    ) -> Result<Option<String>> {
        let address = Address::new(&self.profile, &self.project, name)?;
        let payload = encode_payload(data, &card.file_type)?;

        let object_path = self.object_path(&address);
        let card_path = self.card_path(&address);
        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut stored = card.clone();
        stored.address = address.to_string();
        stored.checksum = Some(checksum(&payload));
        stored.created_at = Some(Utc::now());
        let card_bytes = serde_json::to_vec_pretty(&stored)?;

        // The object path is only written by the last rename, after its card.
        let object_tmp = staging_path(&object_path);
        let card_tmp = staging_path(&card_path);
        let committed = async {
            fs::write(&object_tmp, &payload).await?;
            fs::write(&card_tmp, &card_bytes).await?;
            fs::rename(&card_tmp, &card_path).await?;
            if let Err(e) = fs::rename(&object_tmp, &object_path).await {
                let _ = fs::remove_file(&card_path).await;
                return Err(e);
            }
            Ok::<(), std::io::Error>(())
        }
        .await;

        if let Err(e) = committed {
            warn!("Upload of {} failed: {}", stored.address, e);
            let _ = fs::remove_file(&object_tmp).await;
            let _ = fs::remove_file(&card_tmp).await;
            return Err(e.into());
        }

        info!("Stored {} ({} bytes)", stored.address, payload.len());
        Ok(Some(stored.address))
    }
}
