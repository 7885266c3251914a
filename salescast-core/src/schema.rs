//! Table schema contracts: the gate between raw exports and the model-ready table.
//!
//! Each schema is plain data: a list of [`ColumnSpec`]s giving the column
//! name, its logical type, whether nulls are allowed, and a list of value
//! checks. One validator walks any schema, so the three shapes share the
//! same rules:
//!
//! - [`RAW_IMPORT`]: the point-of-sale export
//! - [`WEATHER_IMPORT`]: the weather export, projected to four columns
//! - [`COMBINED`]: merged sales + weather + derived features
//!
//! Validation borrows the table and never modifies it. Columns not named in
//! a schema are allowed. The first violation found is returned; columns are
//! checked in schema order, and for each column: presence, type,
//! nullability, then checks in declaration order.

use polars::prelude::*;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::columns;
use crate::data::ingest::{is_integer_dtype, is_numeric_dtype};
use crate::domain::{DayOfWeek, DayType, Season};

/// Logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Date,
    /// Any integer width.
    Integer,
    /// Any float width; integer columns are accepted (numeric widening).
    Float,
    Boolean,
    Text,
    /// Text drawn from a fixed, ordered label set (see [`Check::IsIn`]).
    /// Stored as an enum whose categories are that label set, or as plain
    /// text once read back from CSV.
    Categorical,
}

impl ColumnType {
    /// Whether a polars dtype satisfies this logical type.
    pub fn accepts(self, dtype: &DataType) -> bool {
        match self {
            ColumnType::Date => matches!(dtype, DataType::Date | DataType::Datetime(_, _)),
            ColumnType::Integer => is_integer_dtype(dtype),
            ColumnType::Float => is_numeric_dtype(dtype),
            ColumnType::Boolean => dtype == &DataType::Boolean,
            ColumnType::Text => dtype == &DataType::String,
            ColumnType::Categorical => dtype == &DataType::String || dtype.is_enum(),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Date => "date",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
            ColumnType::Categorical => "categorical",
        };
        f.write_str(name)
    }
}

/// A value-domain rule. Nulls are never checked here; see `nullable`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    GreaterThanOrEqual(f64),
    IsIn(&'static [&'static str]),
    /// No two non-null values are equal.
    Unique,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::GreaterThanOrEqual(bound) => write!(f, "greater_than_or_equal_to({bound})"),
            Check::IsIn(labels) => write!(f, "isin({})", labels.join(", ")),
            Check::Unique => f.write_str("unique"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub dtype: ColumnType,
    pub nullable: bool,
    pub checks: &'static [Check],
}

impl ColumnSpec {
    const fn required(name: &'static str, dtype: ColumnType, checks: &'static [Check]) -> Self {
        Self {
            name,
            dtype,
            nullable: false,
            checks,
        }
    }

    const fn nullable(name: &'static str, dtype: ColumnType, checks: &'static [Check]) -> Self {
        Self {
            name,
            dtype,
            nullable: true,
            checks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnSpec],
}

/// A schema violation. Every variant names the schema and the column.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("[{schema}] missing required column '{column}'")]
    MissingColumn {
        schema: &'static str,
        column: &'static str,
    },

    #[error("[{schema}] column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        schema: &'static str,
        column: &'static str,
        expected: ColumnType,
        actual: String,
    },

    #[error("[{schema}] column '{column}': {count} null value(s) in a non-nullable column")]
    NullValues {
        schema: &'static str,
        column: &'static str,
        count: usize,
    },

    #[error("[{schema}] column '{column}': check {check} failed at row {row} (value {value})")]
    CheckFailed {
        schema: &'static str,
        column: &'static str,
        check: String,
        row: usize,
        value: String,
    },

    #[error("[{schema}] column '{column}' could not be read: {reason}")]
    Unreadable {
        schema: &'static str,
        column: &'static str,
        reason: String,
    },
}

impl SchemaError {
    /// The offending column.
    pub fn column(&self) -> &'static str {
        match self {
            SchemaError::MissingColumn { column, .. }
            | SchemaError::TypeMismatch { column, .. }
            | SchemaError::NullValues { column, .. }
            | SchemaError::CheckFailed { column, .. }
            | SchemaError::Unreadable { column, .. } => column,
        }
    }
}

// ── Schemas ──────────────────────────────────────────────────────────

const NON_NEGATIVE: &[Check] = &[Check::GreaterThanOrEqual(0.0)];
const UNIQUE: &[Check] = &[Check::Unique];
const NONE: &[Check] = &[];
const DAY_TYPES: &[Check] = &[Check::IsIn(&DayType::LABELS)];
const SEASONS: &[Check] = &[Check::IsIn(&Season::LABELS)];
const WEEKDAYS: &[Check] = &[Check::IsIn(&DayOfWeek::LABELS)];

const SALES_COLUMNS: [ColumnSpec; 10] = [
    ColumnSpec::required(columns::DATE, ColumnType::Date, UNIQUE),
    ColumnSpec::required(columns::HOURS_OPENED, ColumnType::Integer, NON_NEGATIVE),
    ColumnSpec::required(columns::TIPS, ColumnType::Float, NON_NEGATIVE),
    ColumnSpec::required(columns::TOTAL_SALES, ColumnType::Float, NON_NEGATIVE),
    ColumnSpec::required(columns::IN_STORE_ORDERS, ColumnType::Float, NON_NEGATIVE),
    ColumnSpec::required(columns::ITEM_A_SALES, ColumnType::Float, NON_NEGATIVE),
    ColumnSpec::required(columns::ITEM_B_SALES, ColumnType::Float, NON_NEGATIVE),
    ColumnSpec::required(columns::ITEM_C_SALES, ColumnType::Float, NON_NEGATIVE),
    ColumnSpec::required(columns::FESTIVAL_SALES, ColumnType::Float, NON_NEGATIVE),
    ColumnSpec::required(columns::TYPE_OF_DAY, ColumnType::Text, DAY_TYPES),
];

const WEATHER_COLUMNS: [ColumnSpec; 4] = [
    ColumnSpec::nullable(columns::DATE, ColumnType::Date, UNIQUE),
    ColumnSpec::nullable(columns::AVG_TEMPERATURE, ColumnType::Float, NONE),
    ColumnSpec::nullable(columns::RAIN, ColumnType::Float, NONE),
    ColumnSpec::nullable(columns::SNOW, ColumnType::Float, NONE),
];

const COMBINED_COLUMNS: [ColumnSpec; 18] = [
    SALES_COLUMNS[0],
    SALES_COLUMNS[1],
    SALES_COLUMNS[2],
    SALES_COLUMNS[3],
    SALES_COLUMNS[4],
    SALES_COLUMNS[5],
    SALES_COLUMNS[6],
    SALES_COLUMNS[7],
    SALES_COLUMNS[8],
    SALES_COLUMNS[9],
    WEATHER_COLUMNS[1],
    WEATHER_COLUMNS[2],
    WEATHER_COLUMNS[3],
    ColumnSpec::required(columns::IS_LONG_WEEKEND, ColumnType::Boolean, NONE),
    ColumnSpec::required(columns::IS_FESTIVAL, ColumnType::Boolean, NONE),
    ColumnSpec::required(columns::IS_HOLIDAY, ColumnType::Boolean, NONE),
    ColumnSpec::required(columns::DAY_OF_WEEK, ColumnType::Categorical, WEEKDAYS),
    ColumnSpec::required(columns::SEASON, ColumnType::Categorical, SEASONS),
];

/// The point-of-sale export.
pub const RAW_IMPORT: TableSchema = TableSchema {
    name: "raw_import",
    columns: &SALES_COLUMNS,
};

/// The weather export after projection to date + three measurements.
pub const WEATHER_IMPORT: TableSchema = TableSchema {
    name: "weather_import",
    columns: &WEATHER_COLUMNS,
};

/// The merged, feature-enriched table.
pub const COMBINED: TableSchema = TableSchema {
    name: "combined",
    columns: &COMBINED_COLUMNS,
};

// ── Validation ───────────────────────────────────────────────────────

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// Validate a table against this schema.
    pub fn validate(&self, df: &DataFrame) -> Result<(), SchemaError> {
        for spec in self.columns {
            let column = df.column(spec.name).map_err(|_| SchemaError::MissingColumn {
                schema: self.name,
                column: spec.name,
            })?;
            self.validate_column(spec, column)?;
        }
        tracing::debug!(schema = self.name, rows = df.height(), "schema validation passed");
        Ok(())
    }

    fn validate_column(&self, spec: &ColumnSpec, column: &Column) -> Result<(), SchemaError> {
        let nulls = null_count(column);

        // An all-null column carries no type information (a blank CSV column
        // reads as text); a nullable column of nulls is acceptable as is.
        if spec.nullable && nulls == column.len() {
            return Ok(());
        }

        if !spec.dtype.accepts(column.dtype()) {
            return Err(SchemaError::TypeMismatch {
                schema: self.name,
                column: spec.name,
                expected: spec.dtype,
                actual: column.dtype().to_string(),
            });
        }

        if let DataType::Enum(Some(rev), _) = column.dtype() {
            let categories: Vec<&str> = rev.get_categories().values_iter().collect();
            let mismatched = spec.checks.iter().any(|check| match check {
                Check::IsIn(labels) => categories != *labels,
                _ => false,
            });
            if mismatched {
                return Err(SchemaError::TypeMismatch {
                    schema: self.name,
                    column: spec.name,
                    expected: spec.dtype,
                    actual: format!("enum[{}]", categories.join(", ")),
                });
            }
        }

        if !spec.nullable && nulls > 0 {
            return Err(SchemaError::NullValues {
                schema: self.name,
                column: spec.name,
                count: nulls,
            });
        }

        for check in spec.checks {
            self.run_check(spec, *check, column)?;
        }
        Ok(())
    }

    fn run_check(&self, spec: &ColumnSpec, check: Check, column: &Column) -> Result<(), SchemaError> {
        let unreadable = |e: PolarsError| SchemaError::Unreadable {
            schema: self.name,
            column: spec.name,
            reason: e.to_string(),
        };
        let failed = |row: usize, value: String| SchemaError::CheckFailed {
            schema: self.name,
            column: spec.name,
            check: check.to_string(),
            row,
            value,
        };

        match check {
            Check::GreaterThanOrEqual(bound) => {
                let values = column.cast(&DataType::Float64).map_err(unreadable)?;
                let values = values.f64().map_err(unreadable)?;
                for (row, value) in values.into_iter().enumerate() {
                    if let Some(v) = value {
                        if v < bound {
                            return Err(failed(row, v.to_string()));
                        }
                    }
                }
            }
            Check::IsIn(labels) => {
                let values = column.cast(&DataType::String).map_err(unreadable)?;
                let values = values.str().map_err(unreadable)?;
                for (row, value) in values.into_iter().enumerate() {
                    if let Some(v) = value {
                        if !labels.contains(&v) {
                            return Err(failed(row, format!("'{v}'")));
                        }
                    }
                }
            }
            Check::Unique => {
                let values = column.cast(&DataType::String).map_err(unreadable)?;
                let values = values.str().map_err(unreadable)?;
                let mut seen = HashSet::with_capacity(values.len());
                for (row, value) in values.into_iter().enumerate() {
                    if let Some(v) = value {
                        if !seen.insert(v) {
                            return Err(failed(row, v.to_string()));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Nulls, counting `NaN` as null in float columns.
fn null_count(column: &Column) -> usize {
    let nulls = column.null_count();
    if !matches!(column.dtype(), DataType::Float32 | DataType::Float64) {
        return nulls;
    }
    column
        .cast(&DataType::Float64)
        .ok()
        .and_then(|c| c.f64().ok().map(|ca| ca.into_iter().flatten().filter(|v| v.is_nan()).count()))
        .map_or(nulls, |nan| nulls + nan)
}
