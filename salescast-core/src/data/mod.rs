//! Table ingestion, date handling and date alignment.

pub mod align;
pub mod ingest;

pub use align::{check_coverage, left_merge_on_date, restrict_to_range, AlignError, Boundary, DateRange};
pub use ingest::{read_csv, resolve_input, write_csv, DataError};
