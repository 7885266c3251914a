//! Run manifest: what an assembly run read, produced and how many rows went where.
//!
//! The manifest holds no timestamps, so two runs over the same inputs produce
//! byte-identical manifests and the output hashes can be compared directly.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use salescast_core::data::DateRange;

/// Bumped whenever a field is added, removed or renamed.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestInputs {
    pub sales: PathBuf,
    pub weather: PathBuf,
}

/// Row counts at each stage of an assembly run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub sales_loaded: usize,
    pub weather_loaded: usize,
    pub weather_in_window: usize,
    pub unusual_dropped: usize,
    pub combined: usize,
    pub train: usize,
    pub test: usize,
}

/// BLAKE3 digest of one output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDigest {
    pub name: String,
    pub path: PathBuf,
    pub bytes: usize,
    pub blake3: String,
}

impl OutputDigest {
    pub fn of(name: &str, path: impl Into<PathBuf>, contents: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
            bytes: contents.len(),
            blake3: blake3::hash(contents).to_hex().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub inputs: ManifestInputs,
    pub counts: RecordCounts,
    pub date_range: DateRange,
    pub test_size: usize,
    pub outputs: Vec<OutputDigest>,
}

impl RunManifest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a manifest, rejecting versions newer than this build understands.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: Self = serde_json::from_str(json)?;
        if manifest.schema_version > SCHEMA_VERSION {
            return Err(ManifestError::UnsupportedVersion {
                found: manifest.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(manifest)
    }

    pub fn output(&self, name: &str) -> Option<&OutputDigest> {
        self.outputs.iter().find(|o| o.name == name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("parse manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported manifest schema version {found} (max supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}
