//! Predictor configuration.
//!
//! Resolved once at process startup and passed into `Predictor::initialise`.
//! The core never reads environment variables itself.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scoring::artifact_path;

/// Model version used when none is configured.
pub const DEFAULT_MODEL_VERSION: &str = "v1.0";

/// Model directory used when none is configured.
pub const DEFAULT_MODEL_DIR: &str = "./models";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Predictor configuration resolved at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictorConfig {
    model_dir: PathBuf,
    model_version: String,
    catalog_db: Option<PathBuf>,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            catalog_db: None,
        }
    }
}

impl PredictorConfig {
    pub fn new(
        model_dir: PathBuf,
        model_version: String,
        catalog_db: Option<PathBuf>,
    ) -> ConfigResult<Self> {
        let model_version = model_version.trim().to_string();
        if model_version.is_empty() {
            return Err(ConfigError::Invalid("model_version cannot be empty".into()));
        }
        if model_version.contains(&['/', '\\'][..]) {
            return Err(ConfigError::Invalid(format!(
                "model_version contains a path separator: {}",
                model_version
            )));
        }

        Ok(Self {
            model_dir,
            model_version,
            catalog_db,
        })
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    pub fn catalog_db(&self) -> Option<&Path> {
        self.catalog_db.as_deref()
    }

    /// Expected artifact location for the configured version.
    pub fn artifact_path(&self) -> PathBuf {
        artifact_path(&self.model_dir, &self.model_version)
    }
}
