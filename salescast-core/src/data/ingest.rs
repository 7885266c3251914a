//! CSV ingestion and export.
//!
//! Tables are read with polars, scanning every row for type inference so an
//! integer column is not widened (or narrowed) by a late outlier. The `date`
//! column is parsed with chrono from its text form; polars is never asked to
//! guess date formats.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// `NaiveDate::num_days_from_ce` of 1970-01-01, the origin of polars `Date`.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Errors from reading, parsing and writing tables.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("missing input: {} does not exist", path.display())]
    MissingInput { path: PathBuf },

    #[error("missing input: no *.{extension} file in {}", dir.display())]
    NoInputFile { dir: PathBuf, extension: String },

    #[error("column '{column}' row {row}: cannot parse '{value}' as a date")]
    InvalidDate {
        column: String,
        row: usize,
        value: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Resolve an input location to a single file.
///
/// A file path is returned as is. For a directory, the first file with the
/// given extension in sorted file-name order is used, so the choice does not
/// depend on directory iteration order.
pub fn resolve_input(path: &Path, extension: &str) -> Result<PathBuf, DataError> {
    if !path.exists() {
        return Err(DataError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Ok(path.to_path_buf());
    }

    let entries = std::fs::read_dir(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file = entry.path();
        let matches = file
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if file.is_file() && matches {
            candidates.push(file);
        }
    }
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| DataError::NoInputFile {
            dir: path.to_path_buf(),
            extension: extension.to_string(),
        })
}

/// Read a CSV table with a header row and parse its `date` column.
pub fn read_csv(path: &Path) -> Result<DataFrame, DataError> {
    if !path.is_file() {
        return Err(DataError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|source| DataError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(path = %path.display(), rows = df.height(), cols = df.width(), "read table");
    parse_date_column(df, crate::columns::DATE)
}

/// Write a table as CSV with a header row.
pub fn write_csv<W: Write>(df: &DataFrame, writer: W) -> Result<(), DataError> {
    let mut df = df.clone();
    CsvWriter::new(writer)
        .include_header(true)
        .finish(&mut df)?;
    Ok(())
}

/// Render a table as CSV bytes.
pub fn to_csv_bytes(df: &DataFrame) -> Result<Vec<u8>, DataError> {
    let mut buf = Vec::new();
    write_csv(df, &mut buf)?;
    Ok(buf)
}

/// Convert column `name` to the polars `Date` type.
///
/// Text values are parsed with the accepted formats; datetimes are truncated
/// to their date. Columns of any other type, and missing columns, are left
/// untouched for the schema validator to report.
pub fn parse_date_column(mut df: DataFrame, name: &str) -> Result<DataFrame, DataError> {
    let Ok(column) = df.column(name) else {
        return Ok(df);
    };

    let parsed = match column.dtype() {
        DataType::String => {
            let mut dates = Vec::with_capacity(column.len());
            for (row, value) in column.str()?.into_iter().enumerate() {
                let date = match value.map(str::trim) {
                    None | Some("") => None,
                    Some(text) => Some(parse_date(text).ok_or_else(|| DataError::InvalidDate {
                        column: name.to_string(),
                        row,
                        value: text.to_string(),
                    })?),
                };
                dates.push(date);
            }
            dates_to_column(name, &dates)?
        }
        DataType::Datetime(_, _) => column.cast(&DataType::Date)?,
        _ => return Ok(df),
    };

    df.with_column(parsed)?;
    Ok(df)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Read a `Date` column into chrono dates.
pub fn date_values(column: &Column) -> PolarsResult<Vec<Option<NaiveDate>>> {
    let ca = column.date()?;
    Ok((0..ca.len())
        .map(|i| {
            ca.get(i)
                .and_then(|days| NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE))
        })
        .collect())
}

/// Build a polars `Date` column from chrono dates.
pub fn dates_to_column(name: &str, dates: &[Option<NaiveDate>]) -> PolarsResult<Column> {
    let days: Vec<Option<i32>> = dates
        .iter()
        .map(|d| d.map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
        .collect();
    Column::new(name.into(), days).cast(&DataType::Date)
}

/// Sort rows by `date`, ascending.
pub fn sort_by_date(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.sort([crate::columns::DATE], SortMultipleOptions::default())
}

/// Round every floating-point column to `decimals` places. Other columns are
/// returned unchanged.
pub fn round_float_columns(df: &DataFrame, decimals: u32) -> PolarsResult<DataFrame> {
    let factor = 10f64.powi(decimals as i32);
    let columns = df
        .get_columns()
        .iter()
        .map(|column| match column.dtype() {
            DataType::Float32 | DataType::Float64 => {
                let values = column.cast(&DataType::Float64)?;
                let rounded: Vec<Option<f64>> = values
                    .f64()?
                    .into_iter()
                    .map(|v| v.map(|v| (v * factor).round() / factor))
                    .collect();
                Ok(Column::new(column.name().clone(), rounded))
            }
            _ => Ok(column.clone()),
        })
        .collect::<PolarsResult<Vec<Column>>>()?;
    DataFrame::new(columns)
}

/// Integer or floating-point dtype.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || matches!(dtype, DataType::Float32 | DataType::Float64)
}

pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn date_column_round_trip() {
        let dates = vec![
            NaiveDate::from_ymd_opt(1969, 12, 31),
            NaiveDate::from_ymd_opt(1970, 1, 1),
            None,
            NaiveDate::from_ymd_opt(2024, 2, 29),
        ];
        let column = dates_to_column("date", &dates).unwrap();
        assert_eq!(column.dtype(), &DataType::Date);
        assert_eq!(date_values(&column).unwrap(), dates);
    }

    #[test]
    fn parses_text_dates_in_accepted_formats() {
        let df = DataFrame::new(vec![Column::new(
            "date".into(),
            vec![Some("2024-01-15"), Some("2024/01/16"), None, Some("2024-01-17 00:00:00")],
        )])
        .unwrap();
        let df = parse_date_column(df, "date").unwrap();
        let values = date_values(df.column("date").unwrap()).unwrap();
        assert_eq!(
            values,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 15),
                NaiveDate::from_ymd_opt(2024, 1, 16),
                None,
                NaiveDate::from_ymd_opt(2024, 1, 17),
            ]
        );
    }

    #[test]
    fn unparseable_date_names_row_and_value() {
        let df = DataFrame::new(vec![Column::new(
            "date".into(),
            vec!["2024-01-15", "last tuesday"],
        )])
        .unwrap();
        let err = parse_date_column(df, "date").unwrap_err();
        match err {
            DataError::InvalidDate { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "last tuesday");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn read_csv_infers_types_and_parses_dates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        fs::write(
            &path,
            "date,hours_opened,tips_normalized,type_of_day\n\
             2024-01-01,8,12.5,Holiday\n\
             2024-01-02,9,10,Weekday\n",
        )
        .unwrap();

        let df = read_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("hours_opened").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("tips_normalized").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("type_of_day").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn read_csv_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, DataError::MissingInput { .. }));
    }

    #[test]
    fn resolve_input_picks_first_sorted_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_export.csv"), "x\n1\n").unwrap();
        fs::write(dir.path().join("a_export.csv"), "x\n1\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let picked = resolve_input(dir.path(), "csv").unwrap();
        assert_eq!(picked.file_name().unwrap(), "a_export.csv");

        let file = dir.path().join("b_export.csv");
        assert_eq!(resolve_input(&file, "csv").unwrap(), file);
    }

    #[test]
    fn resolve_input_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_input(dir.path(), "csv").unwrap_err();
        assert!(matches!(err, DataError::NoInputFile { .. }));
        assert!(err.to_string().contains("no *.csv file"));
    }

    #[test]
    fn rounds_only_float_columns() {
        let df = DataFrame::new(vec![
            Column::new("a".into(), vec![Some(1.23456), None, Some(2.005)]),
            Column::new("b".into(), vec![7i64, 8, 9]),
        ])
        .unwrap();
        let rounded = round_float_columns(&df, 2).unwrap();
        let a: Vec<Option<f64>> = rounded.column("a").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(a[0], Some(1.23));
        assert_eq!(a[1], None);
        assert_eq!(rounded.column("b").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn csv_output_is_deterministic() {
        let df = DataFrame::new(vec![
            dates_to_column("date", &[NaiveDate::from_ymd_opt(2024, 3, 1)]).unwrap(),
            Column::new("x".into(), vec![1.5]),
        ])
        .unwrap();
        let first = to_csv_bytes(&df).unwrap();
        let second = to_csv_bytes(&df).unwrap();
        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap(), "date,x\n2024-03-01,1.5\n");
    }
}
