//! Calendar and event features derived from a daily sales table.
//!
//! Every rule has a typed scalar form, a typed sequence form that preserves
//! order and length, and a column form over a polars [`Column`] used by the
//! assembly pipeline. The column forms check the column dtype first: handing a
//! rule a column of the wrong kind is a contract error, never a silent
//! coercion.
//!
//! [`append_features`] adds the five derived columns in their canonical order:
//! `is_long_weekend`, `is_festival`, `is_holiday`, `season`, `day_of_week`.

pub mod calendar;
pub mod events;
pub mod long_weekend;

pub use calendar::{
    day_of_week_column, day_of_week_dtype, days_of_week, label_dtype, season, season_column,
    season_dtype, seasons,
};
pub use events::{
    festival_column, festival_flags, holiday_column, holiday_flags, is_festival, is_holiday,
};
pub use long_weekend::{long_weekend_column, long_weekend_flags};

use polars::prelude::*;
use thiserror::Error;

use crate::columns;

/// Errors raised by feature derivation.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// The input column does not have the shape the rule is defined over.
    #[error("{feature}: expected a {expected} column, got '{column}' of type {actual}")]
    UnsupportedInput {
        feature: &'static str,
        expected: &'static str,
        column: String,
        actual: String,
    },

    #[error("{feature}: {source}")]
    Polars {
        feature: &'static str,
        #[source]
        source: PolarsError,
    },
}

impl FeatureError {
    pub(crate) fn unsupported(feature: &'static str, expected: &'static str, column: &Column) -> Self {
        FeatureError::UnsupportedInput {
            feature,
            expected,
            column: column.name().to_string(),
            actual: column.dtype().to_string(),
        }
    }

    pub(crate) fn polars(feature: &'static str) -> impl FnOnce(PolarsError) -> Self {
        move |source| FeatureError::Polars { feature, source }
    }
}

/// Append the derived feature columns to a merged sales table.
///
/// Reads `date`, `HCF_sales` and `type_of_day`. Rows are assumed to be in
/// chronological order; the long-weekend rule depends on it.
pub fn append_features(mut df: DataFrame) -> Result<DataFrame, FeatureError> {
    let dates = df
        .column(columns::DATE)
        .map_err(FeatureError::polars("features"))?
        .clone();
    let festival_sales = df
        .column(columns::FESTIVAL_SALES)
        .map_err(FeatureError::polars("features"))?
        .clone();
    let day_types = df
        .column(columns::TYPE_OF_DAY)
        .map_err(FeatureError::polars("features"))?
        .clone();

    let derived = [
        long_weekend_column(&day_types)?,
        festival_column(&festival_sales)?,
        holiday_column(&day_types)?,
        season_column(&dates)?,
        day_of_week_column(&dates)?,
    ];

    for column in derived {
        df.with_column(column)
            .map_err(FeatureError::polars("features"))?;
    }

    tracing::debug!(rows = df.height(), "derived calendar and event features");
    Ok(df)
}
