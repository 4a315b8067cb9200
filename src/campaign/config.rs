//! Campaign configuration, optionally loaded from a JSON file. Fields missing
//! from the file take the defaults below.

use crate::constants::{DEFAULT_CORPUS_DIR, DEFAULT_CRASHES_DIR};
use crate::error::FuzzError;
use crate::ubx::serial::SerialConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    /// Directory the fuzzer leaves its inputs in.
    #[serde(default = "default_corpus_dir")]
    pub corpus_dir: PathBuf,
    /// Directory crash artifacts are written to.
    #[serde(default = "default_crashes_dir")]
    pub crashes_dir: PathBuf,
    #[serde(default)]
    pub serial: SerialConfig,
}

fn default_corpus_dir() -> PathBuf {
    DEFAULT_CORPUS_DIR.into()
}

fn default_crashes_dir() -> PathBuf {
    DEFAULT_CRASHES_DIR.into()
}

impl Default for CampaignConfig {
    fn default() -> Self {
        CampaignConfig {
            corpus_dir: default_corpus_dir(),
            crashes_dir: default_crashes_dir(),
            serial: SerialConfig::default(),
        }
    }
}

impl CampaignConfig {
    /// Reads a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FuzzError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            FuzzError::ConfigurationError(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: CampaignConfig = serde_json::from_str(&contents).map_err(|e| {
            FuzzError::ConfigurationError(format!("invalid config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the values a campaign cannot run with. Directory existence is
    /// checked separately when the campaign is built.
    pub fn validate(&self) -> Result<(), FuzzError> {
        self.serial.validate()
    }
}
