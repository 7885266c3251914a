//! Import preparation: raw exports to processed, validated tables.
//!
//! Both stages accept a CSV file or a directory; for a directory the first
//! `*.csv` by file name is used.

use polars::prelude::*;
use std::path::{Path, PathBuf};

use salescast_core::columns;
use salescast_core::data::ingest::{read_csv, resolve_input, round_float_columns, to_csv_bytes};
use salescast_core::schema::{SchemaError, RAW_IMPORT, WEATHER_IMPORT};

use crate::error::PipelineError;
use crate::persist::{write_all_or_nothing, PendingFile};

/// Decimal places kept for sales figures.
pub const SALES_DECIMALS: u32 = 2;

/// What a preparation stage read and wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub source: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
}

/// Load and validate the raw sales export, rounding float columns to two decimals.
pub fn load_sales_export(input: &Path) -> Result<(PathBuf, DataFrame), PipelineError> {
    let source = resolve_input(input, "csv")?;
    let df = read_csv(&source)?;
    RAW_IMPORT.validate(&df)?;
    let df = round_float_columns(&df, SALES_DECIMALS)?;
    Ok((source, df))
}

/// Load the raw weather export, keep `date, avg_temperature, rain, snow`, and validate.
pub fn load_weather_export(input: &Path) -> Result<(PathBuf, DataFrame), PipelineError> {
    let source = resolve_input(input, "csv")?;
    let df = read_csv(&source)?;
    let df = project(&df, &columns::WEATHER, WEATHER_IMPORT.name)?;
    WEATHER_IMPORT.validate(&df)?;
    Ok((source, df))
}

/// Prepare the sales table: `input` → validated, rounded CSV at `output`.
pub fn prepare_sales(input: &Path, output: &Path) -> Result<Prepared, PipelineError> {
    let (source, df) = load_sales_export(input)?;
    persist(source, output, &df, "sales")
}

/// Prepare the weather table: `input` → projected, validated CSV at `output`.
pub fn prepare_weather(input: &Path, output: &Path) -> Result<Prepared, PipelineError> {
    let (source, df) = load_weather_export(input)?;
    persist(source, output, &df, "weather")
}

fn persist(source: PathBuf, output: &Path, df: &DataFrame, table: &str) -> Result<Prepared, PipelineError> {
    write_all_or_nothing(&[PendingFile::new(output, to_csv_bytes(df)?)])?;
    tracing::info!(
        table,
        source = %source.display(),
        output = %output.display(),
        rows = df.height(),
        "prepared table"
    );
    Ok(Prepared {
        source,
        output: output.to_path_buf(),
        rows: df.height(),
    })
}

/// Select `names` in order; a missing name is a schema error.
pub(crate) fn project(
    df: &DataFrame,
    names: &[&'static str],
    schema: &'static str,
) -> Result<DataFrame, PipelineError> {
    if let Some(missing) = names.iter().find(|n| df.column(n).is_err()) {
        return Err(SchemaError::MissingColumn {
            schema,
            column: *missing,
        }
        .into());
    }
    Ok(df.select(names.iter().copied())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_reports_missing_column() {
        let df = DataFrame::new(vec![
            Column::new("date".into(), vec!["2024-01-01"]),
            Column::new("rain".into(), vec![0.0]),
        ])
        .unwrap();
        let err = project(&df, &columns::WEATHER, "weather_import").unwrap_err();
        assert_eq!(
            err.schema_error(),
            Some(&SchemaError::MissingColumn {
                schema: "weather_import",
                column: "avg_temperature"
            })
        );
    }

    #[test]
    fn project_keeps_order_and_drops_extras() {
        let df = DataFrame::new(vec![
            Column::new("snow".into(), vec![0.0]),
            Column::new("humidity".into(), vec![80.0]),
            Column::new("rain".into(), vec![1.0]),
            Column::new("date".into(), vec!["2024-01-01"]),
            Column::new("avg_temperature".into(), vec![3.0]),
        ])
        .unwrap();
        let projected = project(&df, &columns::WEATHER, "weather_import").unwrap();
        let names: Vec<&str> = projected.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["date", "avg_temperature", "rain", "snow"]);
    }
}
