//! Configuration loading for vinadock.
//! Reads a `vinadock.toml` file; every field has a default so an empty file
//! is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Absent means no datastore is configured.
    #[serde(default)]
    pub datastore: Option<DatastoreConfig>,
    #[serde(default)]
    pub vina: VinaConfig,
    #[serde(default)]
    pub docking: DockingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatastoreConfig {
    pub root: PathBuf,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_project")]
    pub project: String,
}

fn default_profile() -> String { "local".to_string() }
fn default_project() -> String { "docking".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VinaConfig {
    #[serde(default = "default_vina")]
    pub executable: PathBuf,
    #[serde(default = "default_obabel")]
    pub obabel: PathBuf,
    /// Padding in angstroms added around the receptor bounding box.
    #[serde(default = "default_box_padding")]
    pub box_padding: f64,
    pub cpu: Option<u32>,
    pub seed: Option<i64>,
}

fn default_vina()        -> PathBuf { PathBuf::from("vina") }
fn default_obabel()      -> PathBuf { PathBuf::from("obabel") }
fn default_box_padding() -> f64 { 4.0 }

impl Default for VinaConfig {
    fn default() -> Self {
        Self {
            executable: default_vina(),
            obabel: default_obabel(),
            box_padding: default_box_padding(),
            cpu: None,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockingConfig {
    #[serde(default = "default_exhaustiveness")]
    pub exhaustiveness: u32,
    #[serde(default = "default_num_modes")]
    pub num_modes: u32,
    /// Parent directory for per-run scratch areas. System temp dir if unset.
    pub scratch_dir: Option<PathBuf>,
}

fn default_exhaustiveness() -> u32 { 10 }
fn default_num_modes()      -> u32 { 9 }

impl Default for DockingConfig {
    fn default() -> Self {
        Self {
            exhaustiveness: default_exhaustiveness(),
            num_modes: default_num_modes(),
            scratch_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String { "vinadock=debug,info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_filter() }
    }
}
