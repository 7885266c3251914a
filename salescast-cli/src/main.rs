//! Salescast CLI: prepare raw exports, assemble the model-ready table, and
//! report prediction errors.
//!
//! Commands:
//! - `prepare-sales` / `prepare-weather`: validate and persist a raw export
//! - `assemble`: merge, derive features, validate, split and persist
//! - `all`: both preparation stages followed by `assemble`
//! - `diagnose`: per-weekday error breakdown for a table with predictions
//!
//! Paths come from `--config` (TOML) with per-command flags taking precedence.
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use salescast_core::data::ingest::read_csv;
use salescast_runner::{
    assemble, diagnose, prepare_sales, prepare_weather, write_weekday_csv, Assembly,
    PipelineConfig, PredictionDiagnostics, Prepared,
};

#[derive(Parser)]
#[command(
    name = "salescast",
    about = "Salescast: restaurant sales feature pipeline"
)]
struct Cli {
    /// Pipeline config (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the raw sales export and write the processed sales table.
    PrepareSales {
        /// Raw export file, or a directory holding one.
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Project and validate the raw weather export and write the processed table.
    PrepareWeather {
        /// Raw export file, or a directory holding one.
        #[arg(long)]
        input: Option<PathBuf>,

        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Build combined, train and test tables from the processed inputs.
    Assemble {
        /// Number of most recent records held out for testing.
        #[arg(long)]
        test_size: Option<usize>,
    },
    /// Run both preparation stages, then assemble.
    All {
        #[arg(long)]
        test_size: Option<usize>,
    },
    /// Per-weekday error breakdown for a table holding the target and `y_pred`.
    Diagnose {
        /// CSV with the target column, `y_pred`, and `day_of_week` or `date`.
        #[arg(long)]
        predictions: PathBuf,

        /// Target column the predictions estimate.
        #[arg(long, default_value = "total_sales_normalized")]
        target: String,

        /// Output CSV. Defaults to `<results_dir>/mae_grouped_<target>.csv`.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config)?;

    match cli.command {
        Commands::PrepareSales { input, output } => {
            let input = input.unwrap_or(config.paths.sales_input);
            let output = output.unwrap_or(config.paths.sales);
            print_prepared("sales", &prepare_sales(&input, &output)?);
        }
        Commands::PrepareWeather { input, output } => {
            let input = input.unwrap_or(config.paths.weather_input);
            let output = output.unwrap_or(config.paths.weather);
            print_prepared("weather", &prepare_weather(&input, &output)?);
        }
        Commands::Assemble { test_size } => {
            override_test_size(&mut config, test_size);
            print_assembly(&config, &assemble(&config)?);
        }
        Commands::All { test_size } => {
            override_test_size(&mut config, test_size);
            let paths = &config.paths;
            print_prepared("sales", &prepare_sales(&paths.sales_input, &paths.sales)?);
            print_prepared(
                "weather",
                &prepare_weather(&paths.weather_input, &paths.weather)?,
            );
            print_assembly(&config, &assemble(&config)?);
        }
        Commands::Diagnose {
            predictions,
            target,
            output,
        } => {
            let table = read_csv(&predictions)
                .with_context(|| format!("failed to load {}", predictions.display()))?;
            let diagnostics = diagnose(&table, &target)?;
            let output = output.unwrap_or_else(|| config.diagnostics_path(&target));
            write_weekday_csv(&diagnostics, &output)?;
            print_diagnostics(&diagnostics);
            println!("Diagnostics saved to: {}", output.display());
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::from_file(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn override_test_size(config: &mut PipelineConfig, test_size: Option<usize>) {
    if let Some(n) = test_size {
        config.split.test_size = n;
    }
}

fn print_prepared(table: &str, prepared: &Prepared) {
    println!(
        "Prepared {table}: {} rows from {} -> {}",
        prepared.rows,
        prepared.source.display(),
        prepared.output.display()
    );
}

fn print_assembly(config: &PipelineConfig, assembly: &Assembly) {
    let m = &assembly.manifest;
    println!();
    println!("=== Assembly ===");
    println!("Date range:      {} to {}", m.date_range.start, m.date_range.end);
    println!("Sales loaded:    {}", m.counts.sales_loaded);
    println!("Unusual dropped: {}", m.counts.unusual_dropped);
    println!("Combined:        {}", m.counts.combined);
    println!("Train / test:    {} / {}", m.counts.train, m.counts.test);
    println!();
    for output in &m.outputs {
        println!("{:<9} {}  {}", output.name, &output.blake3[..16], output.path.display());
    }
    println!("Manifest: {}", config.manifest_path().display());
}

fn print_diagnostics(d: &PredictionDiagnostics) {
    println!();
    println!("=== Prediction error: {} ({} records) ===", d.target, d.records);
    if let Some(mae) = d.mean_absolute_error {
        println!("MAE: {mae:.2}");
    }
    println!(
        "{:<10} {:>7} {:>12} {:>12} {:>10} {:>8}",
        "Day", "Records", "Actual", "Predicted", "Error", "Error%"
    );
    for row in &d.by_weekday {
        let pct = row
            .error_percentage
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<10} {:>7} {:>12.2} {:>12.2} {:>10.2} {:>8}",
            row.day_of_week.as_str(), row.records, row.mean_actual, row.mean_predicted, row.mean_error, pct
        );
    }
}
