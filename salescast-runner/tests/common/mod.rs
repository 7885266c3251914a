//! Shared fixtures: synthetic raw exports written as CSV text.

#![allow(dead_code)]

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::path::Path;

use salescast_runner::PipelineConfig;

pub fn start() -> NaiveDate {
    // A Monday.
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

/// Day-type label for a date; `unusual` lists day offsets labelled "Unusual".
fn day_type(offset: i64, date: NaiveDate, unusual: &[i64]) -> &'static str {
    if unusual.contains(&offset) {
        return "Unusual";
    }
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => "Weekend",
        Weekday::Fri => "Friday",
        // Every fourth Monday is a bank holiday.
        Weekday::Mon if offset % 28 == 0 => "Holiday",
        _ => "Weekday",
    }
}

/// Raw sales export for `days` consecutive days.
pub fn sales_csv(days: i64, unusual: &[i64]) -> String {
    let mut csv = String::from(
        "date,hours_opened,tips_normalized,total_sales_normalized,in_store_orders,\
         item_A_sales,item_B_sales,item_C_sales,HCF_sales,type_of_day\n",
    );
    for i in 0..days {
        let date = start() + Duration::days(i);
        let total = 1000.0 + (i % 7) as f64 * 37.125;
        let festival = if i % 30 == 5 { 120.456 } else { 0.0 };
        csv.push_str(&format!(
            "{date},{hours},{tips:.3},{total:.3},{orders},{a:.2},{b:.2},{c:.2},{festival},{label}\n",
            hours = 10 + i % 2,
            tips = total * 0.1,
            orders = 40 + i % 5,
            a = total * 0.5,
            b = total * 0.3,
            c = total * 0.2,
            label = day_type(i, date, unusual),
        ));
    }
    csv
}

/// Raw weather export covering day offsets `from..to`, with extra columns.
pub fn weather_csv(from: i64, to: i64) -> String {
    let mut csv = String::from("date,avg_temperature,humidity,rain,snow,station\n");
    for i in from..to {
        let date = start() + Duration::days(i);
        let rain = if i % 3 == 0 { String::new() } else { format!("{:.1}", (i % 4) as f64) };
        csv.push_str(&format!(
            "{date},{temp:.1},{humidity},{rain},,YUL\n",
            temp = -5.0 + (i % 20) as f64 * 0.5,
            humidity = 60 + i % 30,
        ));
    }
    csv
}

/// Config rooted at `root`, with the processed sales and weather tables written.
pub fn config_with_inputs(root: &Path, sales: &str, weather: &str) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    let paths = &mut config.paths;
    for p in [
        &mut paths.sales_input,
        &mut paths.weather_input,
        &mut paths.sales,
        &mut paths.weather,
        &mut paths.combined,
        &mut paths.train,
        &mut paths.test,
        &mut paths.results_dir,
    ] {
        *p = root.join(&*p);
    }
    std::fs::create_dir_all(paths.sales.parent().unwrap()).unwrap();
    std::fs::write(&paths.sales, sales).unwrap();
    std::fs::write(&paths.weather, weather).unwrap();
    config
}

pub fn outputs(config: &PipelineConfig) -> Vec<std::path::PathBuf> {
    vec![
        config.paths.combined.clone(),
        config.paths.train.clone(),
        config.paths.test.clone(),
        config.manifest_path(),
    ]
}
