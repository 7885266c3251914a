//! Salescast Core: domain labels, feature rules, table IO and schema contracts.
//!
//! This crate holds everything that is a pure function of a table:
//! - Domain labels (day types, seasons, weekdays) with canonical ordering
//! - Calendar and event features (season, weekday, festival, holiday, long weekend)
//! - CSV ingestion, date parsing and date alignment between sales and weather
//! - Declarative schema contracts for the raw, weather and combined tables
//!
//! Filesystem orchestration (what to read, where to write, atomicity) lives in
//! `salescast-runner`.

pub mod columns;
pub mod data;
pub mod domain;
pub mod features;
pub mod schema;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: error and schema types can cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::DayType>();
        require_sync::<domain::DayType>();
        require_send::<domain::Season>();
        require_sync::<domain::Season>();
        require_send::<domain::DayOfWeek>();
        require_sync::<domain::DayOfWeek>();

        require_send::<schema::TableSchema>();
        require_sync::<schema::TableSchema>();
        require_send::<schema::SchemaError>();
        require_sync::<schema::SchemaError>();

        require_send::<data::DataError>();
        require_send::<data::AlignError>();
        require_send::<features::FeatureError>();
    }
}
