//! # mandi_forecast
//!
//! Command-line front end for short-term mandi price forecasts.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use price_forecast::metrics::backtest;
use price_forecast::models::load_model_cached;
use price_forecast::utils::DateOrder;
use price_forecast::{ForecastConfig, ForecastService, ForecastTable};
use statrs::statistics::Statistics;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mandi_forecast")]
#[command(about = "Short-term mandi price forecasts from a pre-trained model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(Args)]
struct DataArgs {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Price reports CSV (Date, Modal_Price, Min_Price, Max_Price, Market)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Read ambiguous dates such as 03/04/2024 as day first
    #[arg(long)]
    day_first: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast prices past the end of the dataset
    Forecast {
        #[command(flatten)]
        data: DataArgs,

        /// Model artifact (JSON)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Number of days to forecast
        #[arg(long)]
        horizon: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Write recent history merged with the forecast to this CSV
        #[arg(long)]
        chart_out: Option<PathBuf>,

        /// Days of history in the chart output
        #[arg(long)]
        history_window: Option<usize>,
    },

    /// Summarize the aggregated daily series
    Summary {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Forecast the last days of the dataset from the rest and report the error
    Backtest {
        #[command(flatten)]
        data: DataArgs,

        /// Model artifact (JSON)
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Number of held-out days
        #[arg(long)]
        horizon: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn build_config(
    args: &DataArgs,
    model: Option<PathBuf>,
    horizon: Option<usize>,
    history_window: Option<usize>,
) -> Result<ForecastConfig> {
    let mut config = match &args.config {
        Some(path) => ForecastConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ForecastConfig::default(),
    };

    if let Some(data) = &args.data {
        config.data_path = data.clone();
    }
    if let Some(model) = model {
        config.model_path = model;
    }
    if let Some(horizon) = horizon {
        config.horizon_days = horizon;
    }
    if let Some(window) = history_window {
        config.history_window_days = window;
    }
    if args.day_first {
        config.date_order = DateOrder::DayFirst;
    }

    config.validate()?;
    Ok(config)
}

fn print_table(table: &ForecastTable) {
    println!("{:<12} {:>15}", "Date", "Predicted_Price");
    for row in table.rows() {
        println!("{:<12} {:>15.2}", row.date.to_string(), row.predicted_price);
    }
}

/// Mean, lowest and highest of the daily averages
fn price_stats(prices: &[f64]) -> (f64, f64, f64) {
    // qualified: `Iterator::min`/`max` would also match
    (
        prices.iter().mean(),
        Statistics::min(prices.iter()),
        Statistics::max(prices.iter()),
    )
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Forecast {
            data,
            model,
            horizon,
            format,
            chart_out,
            history_window,
        } => {
            let config = build_config(&data, model, horizon, history_window)?;
            let window = config.history_window_days;
            let service = ForecastService::new(config)?;
            let report = service.run()?;

            match format {
                OutputFormat::Table => {
                    println!("Model: {}", report.model_name);
                    print_table(&report.forecast);
                }
                OutputFormat::Json => println!("{}", report.forecast.to_json()?),
                OutputFormat::Csv => print!("{}", report.forecast.to_csv()?),
            }

            if let Some(path) = chart_out {
                report
                    .chart_frame(window)
                    .write_csv(&path)
                    .with_context(|| format!("writing chart data to {}", path.display()))?;
                tracing::info!(path = %path.display(), "wrote chart data");
            }
        }
        Commands::Summary { data } => {
            let config = build_config(&data, None, None, None)?;
            let service = ForecastService::new(config)?;
            let daily = service.load_daily()?;

            let rows = daily.rows();
            let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
                anyhow::bail!("no usable rows in {}", service.config().data_path.display());
            };
            let prices: Vec<f64> = rows.iter().map(|r| r.avg_modal_price).collect();
            let (mean, low, high) = price_stats(&prices);

            println!("Dates:            {} ({} to {})", rows.len(), first.date, last.date);
            println!("Mean modal price: {:.2}", mean);
            println!("Lowest daily avg: {:.2}", low);
            println!("Highest daily avg: {:.2}", high);
            println!(
                "Latest:           {:.2} across {} markets",
                last.avg_modal_price, last.num_markets
            );
        }
        Commands::Backtest {
            data,
            model,
            horizon,
        } => {
            let config = build_config(&data, model, horizon, None)?;
            let service = ForecastService::new(config)?;
            let series = service.load_daily()?.price_series()?;
            let model = load_model_cached(&service.config().model_path)?;

            let result = backtest(&*model, &series, service.config().horizon_days)?;
            println!("Cutoff: {}", result.cutoff_date);
            println!("{:<12} {:>15} {:>12}", "Date", "Predicted_Price", "Actual");
            for (row, actual) in result.forecast.rows().iter().zip(&result.actual) {
                println!(
                    "{:<12} {:>15.2} {:>12.2}",
                    row.date.to_string(),
                    row.predicted_price,
                    actual
                );
            }
            print!("{}", result.accuracy);
        }
    }

    Ok(())
}

fn main() {
    // Logs go to stderr so JSON/CSV output on stdout stays clean
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "price_forecast=info,mandi_forecast=info".into()),
        )
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
