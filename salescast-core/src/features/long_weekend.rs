//! Long-weekend detection.
//!
//! A Holiday directly after a Weekend day marks itself and the two days
//! before it; a Holiday directly before a Weekend day marks itself and the
//! two days after it. Days at either end of the sequence have no neighbour
//! on that side, and marks that would fall outside the sequence are clipped.
//! Flags are only ever set, so overlapping holidays simply union their spans.

use polars::prelude::*;

use super::FeatureError;
use crate::columns;
use crate::domain::DayType;

/// Days marked on each side of a qualifying holiday, not counting the holiday.
const SPAN: usize = 2;

/// Long-weekend flag for each label, in input order.
///
/// The labels must be in chronological order.
pub fn long_weekend_flags<S: AsRef<str>>(day_types: &[S]) -> Vec<bool> {
    let n = day_types.len();
    let mut flags = vec![false; n];

    for i in 0..n {
        if label_at(day_types, Some(i)) != Some(DayType::Holiday.as_str()) {
            continue;
        }

        let weekend = Some(DayType::Weekend.as_str());

        if label_at(day_types, i.checked_sub(1)) == weekend {
            mark(&mut flags, i.saturating_sub(SPAN), i);
        }
        if label_at(day_types, i.checked_add(1)) == weekend {
            mark(&mut flags, i, i + SPAN);
        }
    }

    flags
}

/// `is_long_weekend` column from a chronologically ordered label column.
pub fn long_weekend_column(day_types: &Column) -> Result<Column, FeatureError> {
    if day_types.dtype() != &DataType::String {
        return Err(FeatureError::unsupported(
            "is_long_weekend",
            "string",
            day_types,
        ));
    }
    // A null label is neither a Holiday nor a Weekend.
    let labels: Vec<&str> = day_types
        .str()
        .map_err(FeatureError::polars("is_long_weekend"))?
        .into_iter()
        .map(|v| v.unwrap_or(""))
        .collect();
    Ok(Column::new(
        columns::IS_LONG_WEEKEND.into(),
        long_weekend_flags(&labels),
    ))
}

/// Label at `index`, or `None` when there is no such neighbour.
fn label_at<S: AsRef<str>>(day_types: &[S], index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| day_types.get(i))
        .map(|label| label.as_ref())
}

/// Set `flags[start..=end]`, clipped to the slice.
fn mark(flags: &mut [bool], start: usize, end: usize) {
    let Some(last) = flags.len().checked_sub(1) else {
        return;
    };
    for flag in flags.iter_mut().take(end.min(last) + 1).skip(start) {
        *flag = true;
    }
}
