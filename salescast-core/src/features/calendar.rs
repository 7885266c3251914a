//! Season and weekday columns.

use chrono::NaiveDate;
use polars::prelude::*;

use super::FeatureError;
use crate::columns;
use crate::data::ingest::date_values;
use crate::domain::{DayOfWeek, Season};

/// Season of a single date (month only; year and day are ignored).
pub fn season(date: NaiveDate) -> Season {
    Season::from_date(date)
}

/// Season of each date, in input order.
pub fn seasons(dates: &[NaiveDate]) -> Vec<Season> {
    dates.iter().copied().map(Season::from_date).collect()
}

/// Weekday of each date, in input order.
pub fn days_of_week(dates: &[NaiveDate]) -> Vec<DayOfWeek> {
    dates.iter().copied().map(DayOfWeek::from_date).collect()
}

/// Enum dtype over a fixed label set; sorting follows label order.
pub fn label_dtype(labels: &[&str]) -> DataType {
    let categories = StringChunked::from_slice(PlSmallStr::EMPTY, labels);
    // `from_slice` builds a single chunk.
    let dtype = categories
        .downcast_iter()
        .next()
        .map_or(DataType::String, |array| create_enum_dtype(array.clone()));
    dtype
}

/// `Winter < Spring < Summer < Fall`.
pub fn season_dtype() -> DataType {
    label_dtype(&Season::LABELS)
}

/// `Monday < ... < Sunday`.
pub fn day_of_week_dtype() -> DataType {
    label_dtype(&DayOfWeek::LABELS)
}

/// Season labels for a date column, named `season`, as a [`season_dtype`] enum.
///
/// Null dates stay null; the combined schema rejects them later.
pub fn season_column(dates: &Column) -> Result<Column, FeatureError> {
    let labels = map_dates("season", dates, |d| Season::from_date(d).as_str())?;
    Column::new(columns::SEASON.into(), labels)
        .cast(&season_dtype())
        .map_err(FeatureError::polars("season"))
}

/// Weekday labels for a date column, named `day_of_week`.
pub fn day_of_week_column(dates: &Column) -> Result<Column, FeatureError> {
    let labels = map_dates("day_of_week", dates, |d| DayOfWeek::from_date(d).as_str())?;
    Column::new(columns::DAY_OF_WEEK.into(), labels)
        .cast(&day_of_week_dtype())
        .map_err(FeatureError::polars("day_of_week"))
}

fn map_dates(
    feature: &'static str,
    dates: &Column,
    label: impl Fn(NaiveDate) -> &'static str,
) -> Result<Vec<Option<&'static str>>, FeatureError> {
    if dates.dtype() != &DataType::Date {
        return Err(FeatureError::unsupported(feature, "date", dates));
    }
    let values = date_values(dates).map_err(FeatureError::polars(feature))?;
    Ok(values.into_iter().map(|d| d.map(&label)).collect())
}
