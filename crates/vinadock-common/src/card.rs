//! Metadata descriptor stored next to every datastore object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Describes an object held in the datastore.
///
/// The uploader fills `file_type` and `data_type`; the store fills
/// `address`, `checksum` and `created_at` when the object is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCard {
    /// Datastore address of the object. Empty until stored.
    #[serde(default)]
    pub address: String,

    /// Serialization format of the stored bytes (e.g. "json", "pdb").
    pub file_type: String,

    /// What the object holds (e.g. "docking results", "protein").
    pub data_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// sha256 hex digest of the stored bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DataCard {
    pub fn new(file_type: &str, data_type: &str) -> Self {
        Self {
            address: String::new(),
            file_type: file_type.to_string(),
            data_type: data_type.to_string(),
            description: None,
            checksum: None,
            created_at: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}
