use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::UnknownLabel;

/// Raw classification of a calendar day, as entered in the point-of-sale export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayType {
    Weekday,
    Weekend,
    Friday,
    Holiday,
    /// Closures, private events and other days that are kept out of modelling.
    Unusual,
}

impl DayType {
    pub const ALL: [DayType; 5] = [
        DayType::Weekday,
        DayType::Weekend,
        DayType::Friday,
        DayType::Holiday,
        DayType::Unusual,
    ];

    /// Labels in declaration order; the domain of the `type_of_day` column.
    pub const LABELS: [&'static str; 5] = ["Weekday", "Weekend", "Friday", "Holiday", "Unusual"];

    pub fn as_str(self) -> &'static str {
        Self::LABELS[self as usize]
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayType {
    type Err = UnknownLabel;

    /// Exact, case-sensitive match against [`DayType::LABELS`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayType::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownLabel {
                kind: "day type",
                label: s.to_string(),
            })
    }
}
