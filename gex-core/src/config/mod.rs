//! Configuration for the gex query engine

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::GexResult;

/// Runtime configuration. The catalog database (`gex.db`) and every
/// expression data file referenced by it live under `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GexConfig {
    /// Root directory containing the catalog and the binary expression files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Upper bound on datasets served per request; longer lists are truncated
    #[serde(default = "default_max_datasets")]
    pub max_datasets: usize,
    /// Upper bound on probes resolved per request; longer lists are truncated
    #[serde(default = "default_max_probes")]
    pub max_probes: usize,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_max_datasets() -> usize {
    100
}
fn default_max_probes() -> usize {
    100
}

impl Default for GexConfig {
    fn default() -> Self {
        GexConfig {
            data_dir: default_data_dir(),
            max_datasets: default_max_datasets(),
            max_probes: default_max_probes(),
        }
    }
}

impl GexConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        GexConfig {
            data_dir: data_dir.into(),
            ..GexConfig::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> GexResult<GexConfig> {
        let contents = std::fs::read_to_string(path)?;
        let config: GexConfig = serde_json::from_str(&contents)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Path of the catalog database inside the data directory
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join("gex.db")
    }
}
