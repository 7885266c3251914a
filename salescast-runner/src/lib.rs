//! Salescast Runner: import preparation, feature assembly, chronological
//! split, run manifest and prediction diagnostics.
//!
//! This crate builds on `salescast-core` to provide:
//! - TOML pipeline configuration with defaults for the `data/` layout
//! - Preparation of raw sales and weather exports
//! - Assembly of the validated combined table and its train/test split
//! - All-or-nothing persistence of every output
//! - Run manifest with BLAKE3 hashes of the outputs
//! - Per-weekday prediction error breakdown

pub mod assemble;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod manifest;
pub mod persist;
pub mod prepare;
pub mod split;

pub use assemble::{assemble, build_feature_table, load_sales, load_weather, Assembly, FeatureTable};
pub use config::{ConfigError, PathsConfig, PipelineConfig, SplitConfig};
pub use diagnostics::{
    diagnose, diagnose_values, export_weekday_csv, with_prediction_error, write_weekday_csv,
    PredictionDiagnostics, WeekdayError,
};
pub use error::PipelineError;
pub use manifest::{ManifestError, OutputDigest, RecordCounts, RunManifest, SCHEMA_VERSION};
pub use persist::{write_all_or_nothing, PendingFile};
pub use prepare::{prepare_sales, prepare_weather, Prepared};
pub use split::{split_chronological, Split};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<PipelineConfig>();
        assert_sync::<PipelineConfig>();
    }

    #[test]
    fn assembly_is_send_sync() {
        assert_send::<Assembly>();
        assert_sync::<Assembly>();
        assert_send::<RunManifest>();
        assert_sync::<RunManifest>();
    }

    #[test]
    fn pipeline_error_is_send() {
        assert_send::<PipelineError>();
    }

    #[test]
    fn diagnostics_are_send_sync() {
        assert_send::<PredictionDiagnostics>();
        assert_sync::<PredictionDiagnostics>();
    }
}
