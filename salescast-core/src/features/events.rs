//! Per-day event flags: festival and holiday.

use polars::prelude::*;

use super::FeatureError;
use crate::columns;
use crate::data::ingest::is_numeric_dtype;
use crate::domain::DayType;

/// A festival day is any day with strictly positive festival-linked sales.
///
/// `NaN` is not greater than zero, so it never flags a festival.
pub fn is_festival(festival_sales: f64) -> bool {
    festival_sales > 0.0
}

/// True iff the label is exactly `"Holiday"`.
pub fn is_holiday(day_type: &str) -> bool {
    day_type == DayType::Holiday.as_str()
}

pub fn festival_flags(festival_sales: &[f64]) -> Vec<bool> {
    festival_sales.iter().copied().map(is_festival).collect()
}

pub fn holiday_flags<S: AsRef<str>>(day_types: &[S]) -> Vec<bool> {
    day_types.iter().map(|d| is_holiday(d.as_ref())).collect()
}

/// `is_festival` column from a numeric festival-sales column. Nulls flag false.
pub fn festival_column(festival_sales: &Column) -> Result<Column, FeatureError> {
    if !is_numeric_dtype(festival_sales.dtype()) {
        return Err(FeatureError::unsupported("is_festival", "numeric", festival_sales));
    }
    let values = festival_sales
        .cast(&DataType::Float64)
        .map_err(FeatureError::polars("is_festival"))?;
    let flags: Vec<bool> = values
        .f64()
        .map_err(FeatureError::polars("is_festival"))?
        .into_iter()
        .map(|v| v.is_some_and(is_festival))
        .collect();
    Ok(Column::new(columns::IS_FESTIVAL.into(), flags))
}

/// `is_holiday` column from a day-type label column. Nulls flag false.
pub fn holiday_column(day_types: &Column) -> Result<Column, FeatureError> {
    if day_types.dtype() != &DataType::String {
        return Err(FeatureError::unsupported("is_holiday", "string", day_types));
    }
    let flags: Vec<bool> = day_types
        .str()
        .map_err(FeatureError::polars("is_holiday"))?
        .into_iter()
        .map(|v| v.is_some_and(is_holiday))
        .collect();
    Ok(Column::new(columns::IS_HOLIDAY.into(), flags))
}
