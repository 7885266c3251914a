//! Feature assembly: processed sales + weather → validated combined table,
//! chronological train/test split, run manifest.
//!
//! Stages, in order:
//! 1. load both tables and check them against their import schemas
//! 2. sort sales by date
//! 3. coverage: both boundary sales dates must appear in the weather data
//! 4. restrict weather to the sales window and left-merge it on date
//! 5. append derived features
//! 6. validate against the combined schema
//! 7. drop "Unusual" days
//! 8. split and persist combined, train, test and the manifest together
//!
//! Any failure before step 8 leaves the filesystem untouched, and step 8
//! itself is all-or-nothing.

use polars::prelude::*;
use std::path::Path;

use salescast_core::columns;
use salescast_core::data::ingest::{read_csv, sort_by_date, to_csv_bytes};
use salescast_core::data::{check_coverage, left_merge_on_date, restrict_to_range, DateRange};
use salescast_core::domain::DayType;
use salescast_core::features::append_features;
use salescast_core::schema::{COMBINED, RAW_IMPORT, WEATHER_IMPORT};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::manifest::{ManifestInputs, OutputDigest, RecordCounts, RunManifest, SCHEMA_VERSION};
use crate::persist::{write_all_or_nothing, PendingFile};
use crate::prepare::project;
use crate::split::{split_chronological, Split};

/// The validated, model-ready table before splitting.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub combined: DataFrame,
    pub date_range: DateRange,
    pub counts: RecordCounts,
}

/// Everything an assembly run produced.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub combined: DataFrame,
    pub split: Split,
    pub manifest: RunManifest,
}

/// Load the processed sales table and check it against the raw-import schema.
pub fn load_sales(path: &Path) -> Result<DataFrame, PipelineError> {
    let df = read_csv(path)?;
    RAW_IMPORT.validate(&df)?;
    Ok(df)
}

/// Load the processed weather table, keep the four weather columns, and validate.
pub fn load_weather(path: &Path) -> Result<DataFrame, PipelineError> {
    let df = read_csv(path)?;
    let df = project(&df, &columns::WEATHER, WEATHER_IMPORT.name)?;
    WEATHER_IMPORT.validate(&df)?;
    Ok(df)
}

/// Merge, derive, validate and filter in memory. Nothing is written.
pub fn build_feature_table(sales: &DataFrame, weather: &DataFrame) -> Result<FeatureTable, PipelineError> {
    let sales = sort_by_date(sales)?;

    let date_range = check_coverage(&sales, weather)?;
    tracing::debug!(start = %date_range.start, end = %date_range.end, "weather covers sales range");

    let weather_window = restrict_to_range(weather, date_range)?;
    let merged = left_merge_on_date(&sales, &weather_window, &columns::WEATHER_VALUES)?;
    tracing::debug!(rows = merged.height(), weather_rows = weather_window.height(), "merged weather onto sales");

    let featured = append_features(merged)?;
    COMBINED.validate(&featured)?;

    let combined = drop_unusual(&featured)?;
    let unusual_dropped = featured.height() - combined.height();
    tracing::info!(
        rows = combined.height(),
        unusual_dropped,
        "built combined feature table"
    );

    Ok(FeatureTable {
        counts: RecordCounts {
            sales_loaded: sales.height(),
            weather_loaded: weather.height(),
            weather_in_window: weather_window.height(),
            unusual_dropped,
            combined: combined.height(),
            ..Default::default()
        },
        combined,
        date_range,
    })
}

/// Run the full assembly described by `config`.
pub fn assemble(config: &PipelineConfig) -> Result<Assembly, PipelineError> {
    let paths = &config.paths;

    let sales = load_sales(&paths.sales)?;
    let weather = load_weather(&paths.weather)?;
    tracing::info!(
        sales = %paths.sales.display(),
        weather = %paths.weather.display(),
        sales_rows = sales.height(),
        weather_rows = weather.height(),
        "loaded inputs"
    );

    let table = build_feature_table(&sales, &weather)?;
    let split = split_chronological(&table.combined, config.split.test_size);
    tracing::info!(
        train = split.train.height(),
        test = split.test.height(),
        "split chronologically"
    );

    let outputs = [
        ("combined", &paths.combined, to_csv_bytes(&table.combined)?),
        ("train", &paths.train, to_csv_bytes(&split.train)?),
        ("test", &paths.test, to_csv_bytes(&split.test)?),
    ];

    let manifest = RunManifest {
        schema_version: SCHEMA_VERSION,
        inputs: ManifestInputs {
            sales: paths.sales.clone(),
            weather: paths.weather.clone(),
        },
        counts: RecordCounts {
            train: split.train.height(),
            test: split.test.height(),
            ..table.counts
        },
        date_range: table.date_range,
        test_size: config.split.test_size,
        outputs: outputs
            .iter()
            .map(|(name, path, bytes)| OutputDigest::of(name, *path, bytes))
            .collect(),
    };

    let mut files: Vec<PendingFile> = outputs
        .into_iter()
        .map(|(_, path, bytes)| PendingFile::new(path, bytes))
        .collect();
    files.push(PendingFile::new(
        config.manifest_path(),
        manifest.to_json()?.into_bytes(),
    ));
    write_all_or_nothing(&files)?;

    tracing::info!(
        combined = %paths.combined.display(),
        train = %paths.train.display(),
        test = %paths.test.display(),
        "assembly complete"
    );

    Ok(Assembly {
        combined: table.combined,
        split,
        manifest,
    })
}

/// Remove days labelled "Unusual".
fn drop_unusual(df: &DataFrame) -> Result<DataFrame, PipelineError> {
    let labels = df.column(columns::TYPE_OF_DAY)?.str()?;
    let keep: BooleanChunked = labels
        .into_iter()
        .map(|label| label != Some(DayType::Unusual.as_str()))
        .collect();
    Ok(df.filter(&keep)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use salescast_core::data::ingest::dates_to_column;
    use salescast_core::data::AlignError;
    use salescast_core::domain::{DayOfWeek, Season};

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap() + chrono::Duration::days(i)
    }

    fn sales(order: &[i64], labels: &[&str]) -> DataFrame {
        let n = order.len();
        let dates: Vec<Option<NaiveDate>> = order.iter().map(|&i| Some(day(i))).collect();
        let ones = vec![1.0; n];
        DataFrame::new(vec![
            dates_to_column("date", &dates).unwrap(),
            Column::new("hours_opened".into(), vec![8i64; n]),
            Column::new("tips_normalized".into(), ones.clone()),
            Column::new("total_sales_normalized".into(), ones.clone()),
            Column::new("in_store_orders".into(), ones.clone()),
            Column::new("item_A_sales".into(), ones.clone()),
            Column::new("item_B_sales".into(), ones.clone()),
            Column::new("item_C_sales".into(), ones),
            Column::new("HCF_sales".into(), vec![0.0; n]),
            Column::new("type_of_day".into(), labels.to_vec()),
        ])
        .unwrap()
    }

    fn weather(days: std::ops::Range<i64>) -> DataFrame {
        let dates: Vec<Option<NaiveDate>> = days.clone().map(|i| Some(day(i))).collect();
        let temps: Vec<Option<f64>> = days.clone().map(|i| Some(i as f64)).collect();
        let n = dates.len();
        DataFrame::new(vec![
            dates_to_column("date", &dates).unwrap(),
            Column::new("avg_temperature".into(), temps),
            Column::new("rain".into(), vec![Some(0.0); n]),
            Column::new("snow".into(), vec![None::<f64>; n]),
        ])
        .unwrap()
    }

    #[test]
    fn sorts_sales_before_deriving_features() {
        // Out-of-order input: the Holiday on day 1 sits before a weekend once sorted.
        let table = build_feature_table(
            &sales(&[2, 0, 1, 3], &["Weekend", "Weekday", "Holiday", "Weekend"]),
            &weather(-2..6),
        )
        .unwrap();
        let flags: Vec<bool> = table
            .combined
            .column("is_long_weekend")
            .unwrap()
            .bool()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(flags, vec![false, true, true, true]);
        assert_eq!(table.date_range, DateRange { start: day(0), end: day(3) });
    }

    #[test]
    fn drops_unusual_days_after_validation() {
        let table = build_feature_table(
            &sales(&[0, 1, 2], &["Weekday", "Unusual", "Weekday"]),
            &weather(0..3),
        )
        .unwrap();
        assert_eq!(table.combined.height(), 2);
        assert_eq!(table.counts.unusual_dropped, 1);
        assert_eq!(table.counts.sales_loaded, 3);
    }

    #[test]
    fn weather_window_is_restricted() {
        let table = build_feature_table(&sales(&[0, 1], &["Weekday", "Weekday"]), &weather(-10..10))
            .unwrap();
        assert_eq!(table.counts.weather_loaded, 20);
        assert_eq!(table.counts.weather_in_window, 2);
        let temps: Vec<Option<f64>> = table
            .combined
            .column("avg_temperature")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(temps, vec![Some(0.0), Some(1.0)]);
    }

    #[test]
    fn categorical_columns_sort_in_label_order() {
        // 2024-05-01 .. 2024-12-31 spans all four seasons.
        let order: Vec<i64> = (0..245).collect();
        let table = build_feature_table(&sales(&order, &["Weekday"; 245]), &weather(0..245)).unwrap();
        let sorted_labels = |name: &str| -> Vec<String> {
            let sorted = table
                .combined
                .sort([name], SortMultipleOptions::default())
                .unwrap();
            let mut labels: Vec<String> = sorted
                .column(name)
                .unwrap()
                .cast(&DataType::String)
                .unwrap()
                .str()
                .unwrap()
                .into_no_null_iter()
                .map(str::to_string)
                .collect();
            labels.dedup();
            labels
        };
        assert_eq!(sorted_labels("season"), Season::LABELS);
        assert_eq!(sorted_labels("day_of_week"), DayOfWeek::LABELS);
    }

    #[test]
    fn uncovered_end_date_is_reported() {
        let err = build_feature_table(&sales(&[0, 1, 2], &["Weekday"; 3]), &weather(0..2)).unwrap_err();
        assert!(matches!(err, PipelineError::Align(AlignError::Coverage { .. })));
    }
}
