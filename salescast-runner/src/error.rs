//! Pipeline error type: every failure a stage can report, converted from the
//! core layer errors with `#[from]`.

use std::path::PathBuf;
use thiserror::Error;

use salescast_core::data::{AlignError, DataError};
use salescast_core::features::FeatureError;
use salescast_core::schema::SchemaError;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Align(#[from] AlignError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("schema validation failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("table operation failed: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialize run manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("column '{column}' not found in {table}")]
    MissingColumn { table: &'static str, column: String },

    #[error("column '{column}' in {table}: expected {expected}, got {actual}")]
    ColumnType {
        table: &'static str,
        column: String,
        expected: &'static str,
        actual: String,
    },

    #[error("column '{column}' has no value at row {row}")]
    MissingValue { column: String, row: usize },
}

impl PipelineError {
    /// Schema violation behind this error, if any.
    pub fn schema_error(&self) -> Option<&SchemaError> {
        match self {
            PipelineError::Schema(e) => Some(e),
            _ => None,
        }
    }
}
