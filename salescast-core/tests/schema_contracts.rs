//! Integration tests for the table contracts against realistic frames.

use chrono::NaiveDate;
use polars::prelude::*;
use salescast_core::data::ingest::dates_to_column;
use salescast_core::features::append_features;
use salescast_core::schema::{SchemaError, COMBINED, RAW_IMPORT};

fn raw_sales(n: u32) -> DataFrame {
    let dates: Vec<Option<NaiveDate>> = (0..n)
        .map(|i| NaiveDate::from_ymd_opt(2024, 1, 1).map(|d| d + chrono::Duration::days(i as i64)))
        .collect();
    let money = |scale: f64| -> Vec<f64> { (0..n).map(|i| i as f64 * scale).collect() };
    let day_types: Vec<&str> = (0..n)
        .map(|i| match i % 7 {
            4 => "Friday",
            5 | 6 => "Weekend",
            _ => "Weekday",
        })
        .collect();

    DataFrame::new(vec![
        dates_to_column("date", &dates).unwrap(),
        Column::new("hours_opened".into(), vec![10i64; n as usize]),
        Column::new("tips_normalized".into(), money(0.5)),
        Column::new("total_sales_normalized".into(), money(12.25)),
        Column::new("in_store_orders".into(), money(1.0)),
        Column::new("item_A_sales".into(), money(2.0)),
        Column::new("item_B_sales".into(), money(3.0)),
        Column::new("item_C_sales".into(), money(4.0)),
        Column::new("HCF_sales".into(), vec![0.0; n as usize]),
        Column::new("type_of_day".into(), day_types),
    ])
    .unwrap()
}

fn with_weather(mut df: DataFrame) -> DataFrame {
    let n = df.height();
    df.with_column(Column::new("avg_temperature".into(), vec![Some(4.5); n]))
        .unwrap();
    df.with_column(Column::new("rain".into(), vec![None::<f64>; n]))
        .unwrap();
    df.with_column(Column::new("snow".into(), vec![Some(0.0); n]))
        .unwrap();
    df
}

#[test]
fn conforming_raw_table_passes_and_is_unchanged() {
    let df = raw_sales(14);
    let before = df.clone();
    assert_eq!(RAW_IMPORT.validate(&df), Ok(()));
    assert!(df.equals_missing(&before));
}

#[test]
fn negative_tips_fail_with_column_and_check() {
    let mut df = raw_sales(5);
    df.with_column(Column::new(
        "tips_normalized".into(),
        vec![1.0, 2.0, -0.5, 1.0, 1.0],
    ))
    .unwrap();
    let err = RAW_IMPORT.validate(&df).unwrap_err();
    assert_eq!(err.column(), "tips_normalized");
    let msg = err.to_string();
    assert!(msg.contains("raw_import"), "{msg}");
    assert!(msg.contains("greater_than_or_equal_to"), "{msg}");
    assert!(msg.contains("row 2"), "{msg}");
}

#[test]
fn unknown_day_type_fails() {
    let mut df = raw_sales(3);
    df.with_column(Column::new(
        "type_of_day".into(),
        vec!["Weekday", "Holidy", "Weekend"],
    ))
    .unwrap();
    let err = RAW_IMPORT.validate(&df).unwrap_err();
    assert!(matches!(
        err,
        SchemaError::CheckFailed { column: "type_of_day", row: 1, .. }
    ));
}

#[test]
fn float_hours_opened_is_a_type_mismatch() {
    let mut df = raw_sales(2);
    df.with_column(Column::new("hours_opened".into(), vec![9.5, 10.0]))
        .unwrap();
    let err = RAW_IMPORT.validate(&df).unwrap_err();
    assert!(matches!(err, SchemaError::TypeMismatch { column: "hours_opened", .. }));
}

#[test]
fn null_sales_value_is_rejected() {
    let mut df = raw_sales(3);
    df.with_column(Column::new(
        "item_B_sales".into(),
        vec![Some(1.0), None, Some(2.0)],
    ))
    .unwrap();
    let err = RAW_IMPORT.validate(&df).unwrap_err();
    assert_eq!(
        err,
        SchemaError::NullValues {
            schema: "raw_import",
            column: "item_B_sales",
            count: 1
        }
    );
}

#[test]
fn featured_table_satisfies_combined_contract() {
    let df = append_features(with_weather(raw_sales(21))).unwrap();
    assert_eq!(COMBINED.validate(&df), Ok(()));
}

#[test]
fn combined_requires_derived_columns() {
    let df = with_weather(raw_sales(3));
    let err = COMBINED.validate(&df).unwrap_err();
    assert!(matches!(err, SchemaError::MissingColumn { column: "is_long_weekend", .. }));
}

#[test]
fn extra_columns_are_allowed() {
    let mut df = raw_sales(3);
    df.with_column(Column::new("notes".into(), vec!["a", "b", "c"]))
        .unwrap();
    assert_eq!(RAW_IMPORT.validate(&df), Ok(()));
}
