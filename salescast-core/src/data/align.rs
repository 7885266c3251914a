//! Date alignment between the sales and weather tables.
//!
//! The sales table is the spine: every sales day keeps exactly one row, and
//! weather values are looked up by date. Weather days outside the sales window
//! are dropped, and sales days without a weather row get nulls.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use super::ingest::date_values;
use crate::columns;

/// Which end of the sales date range is not covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Start => f.write_str("start"),
            Boundary::End => f.write_str("end"),
        }
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Errors from aligning tables by date.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("sales {boundary} date {date} not in weather data; check the weather date range")]
    Coverage { boundary: Boundary, date: NaiveDate },

    #[error("{table} table has no dated rows")]
    Empty { table: &'static str },

    #[error("{table} table has more than one row for {date}")]
    DuplicateDate { table: &'static str, date: NaiveDate },

    #[error("alignment failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Earliest and latest non-null date of a table.
pub fn date_range(df: &DataFrame) -> Result<Option<DateRange>, AlignError> {
    let dates = date_values(df.column(columns::DATE)?)?;
    let mut known = dates.into_iter().flatten();
    let Some(first) = known.next() else {
        return Ok(None);
    };
    let (start, end) = known.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Ok(Some(DateRange { start, end }))
}

/// Check that the weather table contains both boundary dates of the sales
/// table, and return the sales date range.
pub fn check_coverage(sales: &DataFrame, weather: &DataFrame) -> Result<DateRange, AlignError> {
    let range = date_range(sales)?.ok_or(AlignError::Empty { table: "sales" })?;
    let weather_dates = date_values(weather.column(columns::DATE)?)?;

    for (boundary, date) in [(Boundary::Start, range.start), (Boundary::End, range.end)] {
        if !weather_dates.contains(&Some(date)) {
            return Err(AlignError::Coverage { boundary, date });
        }
    }

    Ok(range)
}

/// Keep only rows whose date falls inside `range`. Rows without a date are dropped.
pub fn restrict_to_range(df: &DataFrame, range: DateRange) -> Result<DataFrame, AlignError> {
    let dates = date_values(df.column(columns::DATE)?)?;
    let mask: BooleanChunked = dates
        .into_iter()
        .map(|d| d.is_some_and(|d| range.contains(d)))
        .collect();
    Ok(df.filter(&mask)?)
}

/// Left-merge numeric `value_columns` of `right` onto `left` by date.
///
/// Every row of `left` is kept, in order. The merged columns are `Float64`;
/// days missing from `right` get nulls. Duplicate dates in `right` are an
/// error since they would make the lookup ambiguous.
pub fn left_merge_on_date(
    left: &DataFrame,
    right: &DataFrame,
    value_columns: &[&str],
) -> Result<DataFrame, AlignError> {
    let right_dates = date_values(right.column(columns::DATE)?)?;
    let mut row_of: HashMap<NaiveDate, usize> = HashMap::with_capacity(right_dates.len());
    for (row, date) in right_dates.into_iter().enumerate() {
        let Some(date) = date else { continue };
        if row_of.insert(date, row).is_some() {
            return Err(AlignError::DuplicateDate {
                table: "weather",
                date,
            });
        }
    }

    let left_rows: Vec<Option<usize>> = date_values(left.column(columns::DATE)?)?
        .into_iter()
        .map(|d| d.and_then(|d| row_of.get(&d).copied()))
        .collect();

    let mut merged = left.clone();
    for name in value_columns {
        let values = right.column(name)?.cast(&DataType::Float64)?;
        let values = values.f64()?;
        let aligned: Vec<Option<f64>> = left_rows
            .iter()
            .map(|row| row.and_then(|r| values.get(r)))
            .collect();
        merged.with_column(Column::new((*name).into(), aligned))?;
    }

    Ok(merged)
}
