//! Pipeline configuration, loaded from TOML.
//!
//! Every field has a default matching the conventional `data/` layout, so an
//! empty file (or no file) is a valid configuration:
//!
//! ```toml
//! [paths]
//! sales_input = "data/inputs/sales"
//! combined = "data/processed/combined.csv"
//!
//! [split]
//! test_size = 30
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Where each stage reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Raw sales export: a CSV file, or a directory holding one.
    pub sales_input: PathBuf,
    /// Raw weather export: a CSV file, or a directory holding one.
    pub weather_input: PathBuf,
    pub sales: PathBuf,
    pub weather: PathBuf,
    pub combined: PathBuf,
    pub train: PathBuf,
    pub test: PathBuf,
    pub results_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            sales_input: "data/inputs/sales".into(),
            weather_input: "data/inputs/weather".into(),
            sales: "data/processed/sales.csv".into(),
            weather: "data/processed/weather.csv".into(),
            combined: "data/processed/combined.csv".into(),
            train: "data/modelling/train.csv".into(),
            test: "data/modelling/test.csv".into(),
            results_dir: "results".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SplitConfig {
    /// Number of most recent records held out as the test partition.
    pub test_size: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { test_size: 30 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    pub split: SplitConfig,
}

impl PipelineConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let manifest = self.manifest_path();
        let outputs = [
            &self.paths.combined,
            &self.paths.train,
            &self.paths.test,
            &manifest,
        ];
        for (i, a) in outputs.iter().enumerate() {
            if outputs[i + 1..].contains(a) {
                return Err(ConfigError::Invalid(format!(
                    "output path {} is used twice",
                    a.display()
                )));
            }
        }
        Ok(())
    }

    /// The run manifest sits next to the combined table.
    pub fn manifest_path(&self) -> PathBuf {
        self.paths.combined.with_file_name("manifest.json")
    }

    /// Diagnostics CSV for a target column, e.g. `results/mae_grouped_total_sales_normalized.csv`.
    pub fn diagnostics_path(&self, target: &str) -> PathBuf {
        self.paths.results_dir.join(format!("mae_grouped_{target}.csv"))
    }
}
