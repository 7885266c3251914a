//! Prediction diagnostics: signed error per record, mean absolute error, and
//! an error breakdown by day of the week.
//!
//! Per-weekday means are rounded to two decimals before the error percentage
//! is taken, and the percentage is `|mean error| / mean actual * 100`, also
//! rounded to two decimals. Weekdays with no records are left out; a weekday
//! whose mean actual is zero has no percentage.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use salescast_core::columns;
use salescast_core::data::ingest::is_numeric_dtype;
use salescast_core::domain::DayOfWeek;
use salescast_core::features::day_of_week_column;

use crate::error::PipelineError;

/// Column holding model predictions.
pub const PREDICTION: &str = "y_pred";
/// Column holding `y_pred - actual`.
pub const PREDICTION_ERROR: &str = "prediction_error";

/// Mean actual, predicted and error for one weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayError {
    pub day_of_week: DayOfWeek,
    pub records: usize,
    pub mean_actual: f64,
    pub mean_predicted: f64,
    pub mean_error: f64,
    pub error_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionDiagnostics {
    pub target: String,
    pub records: usize,
    /// `None` for an empty table.
    pub mean_absolute_error: Option<f64>,
    /// Monday first.
    pub by_weekday: Vec<WeekdayError>,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Signed prediction errors, `predicted - actual`.
pub fn prediction_errors(actual: &[f64], predicted: &[f64]) -> Vec<f64> {
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| p - a)
        .collect()
}

/// Diagnostics over aligned slices of weekday, actual and predicted values.
pub fn diagnose_values(
    target: &str,
    days: &[DayOfWeek],
    actual: &[f64],
    predicted: &[f64],
) -> PredictionDiagnostics {
    let errors = prediction_errors(actual, predicted);
    let mean_absolute_error = (!errors.is_empty())
        .then(|| errors.iter().map(|e| e.abs()).sum::<f64>() / errors.len() as f64);

    // DayOfWeek orders Monday..Sunday, so the map iterates in calendar order.
    let mut groups: BTreeMap<DayOfWeek, (Vec<f64>, Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for (i, day) in days.iter().enumerate().take(errors.len()) {
        let group = groups.entry(*day).or_default();
        group.0.push(actual[i]);
        group.1.push(predicted[i]);
        group.2.push(errors[i]);
    }

    let by_weekday = groups
        .into_iter()
        .map(|(day_of_week, (a, p, e))| {
            let mean_actual = round2(mean(&a));
            let mean_error = round2(mean(&e));
            WeekdayError {
                day_of_week,
                records: a.len(),
                mean_actual,
                mean_predicted: round2(mean(&p)),
                mean_error,
                error_percentage: (mean_actual != 0.0)
                    .then(|| round2(mean_error.abs() / mean_actual * 100.0)),
            }
        })
        .collect();

    PredictionDiagnostics {
        target: target.to_string(),
        records: errors.len(),
        mean_absolute_error,
        by_weekday,
    }
}

/// Diagnostics for a table holding `target`, `y_pred`, and either
/// `day_of_week` or `date`.
pub fn diagnose(df: &DataFrame, target: &str) -> Result<PredictionDiagnostics, PipelineError> {
    let actual = numeric_values(df, target)?;
    let predicted = numeric_values(df, PREDICTION)?;
    let days = weekdays(df)?;
    let diagnostics = diagnose_values(target, &days, &actual, &predicted);
    tracing::info!(
        target,
        records = diagnostics.records,
        mae = diagnostics.mean_absolute_error,
        "computed prediction diagnostics"
    );
    Ok(diagnostics)
}

/// Append the signed `prediction_error` column.
pub fn with_prediction_error(df: &DataFrame, target: &str) -> Result<DataFrame, PipelineError> {
    let errors = prediction_errors(&numeric_values(df, target)?, &numeric_values(df, PREDICTION)?);
    let mut out = df.clone();
    out.with_column(Column::new(PREDICTION_ERROR.into(), errors))?;
    Ok(out)
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, PipelineError> {
    df.column(name).map_err(|_| PipelineError::MissingColumn {
        table: "predictions",
        column: name.to_string(),
    })
}

fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, PipelineError> {
    let col = column(df, name)?;
    if !is_numeric_dtype(col.dtype()) {
        return Err(PipelineError::ColumnType {
            table: "predictions",
            column: name.to_string(),
            expected: "numeric",
            actual: col.dtype().to_string(),
        });
    }
    let values = col.cast(&DataType::Float64)?;
    let parsed: Result<Vec<f64>, PipelineError> = values
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.filter(|v| !v.is_nan()).ok_or_else(|| PipelineError::MissingValue {
                column: name.to_string(),
                row,
            })
        })
        .collect();
    parsed
}

fn weekdays(df: &DataFrame) -> Result<Vec<DayOfWeek>, PipelineError> {
    let labels = match df.column(columns::DAY_OF_WEEK) {
        Ok(col) => col.cast(&DataType::String)?,
        Err(_) => day_of_week_column(column(df, columns::DATE)?)?.cast(&DataType::String)?,
    };
    let days: Result<Vec<DayOfWeek>, PipelineError> = labels
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, label)| {
            label
                .and_then(|l| l.parse::<DayOfWeek>().ok())
                .ok_or_else(|| PipelineError::MissingValue {
                    column: columns::DAY_OF_WEEK.to_string(),
                    row,
                })
        })
        .collect();
    days
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Render the weekday breakdown as CSV.
///
/// Columns: day_of_week, records, {target}, y_pred, prediction_error,
/// error_percentage (empty when undefined).
pub fn export_weekday_csv(diagnostics: &PredictionDiagnostics) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "day_of_week",
        "records",
        diagnostics.target.as_str(),
        PREDICTION,
        PREDICTION_ERROR,
        "error_percentage",
    ])?;

    for row in &diagnostics.by_weekday {
        wtr.write_record([
            row.day_of_week.as_str().to_string(),
            row.records.to_string(),
            format!("{:.2}", row.mean_actual),
            format!("{:.2}", row.mean_predicted),
            format!("{:.2}", row.mean_error),
            row.error_percentage
                .map(|p| format!("{p:.2}"))
                .unwrap_or_default(),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush diagnostics CSV")?;
    String::from_utf8(bytes).context("diagnostics CSV is not UTF-8")
}

/// Write the weekday breakdown CSV to `path`, creating parent directories.
pub fn write_weekday_csv(diagnostics: &PredictionDiagnostics, path: &Path) -> Result<()> {
    let csv = export_weekday_csv(diagnostics)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
