//! Domain types: day-type labels and the fixed calendar categories.

pub mod calendar;
pub mod day_type;

pub use calendar::{DayOfWeek, Season};
pub use day_type::DayType;

use thiserror::Error;

/// A label that is not part of one of the closed label sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} label '{label}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}
