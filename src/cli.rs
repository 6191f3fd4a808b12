//! CLI definition and pipeline orchestration.

use chrono::NaiveDate;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::backtest_csv::write_backtest_csv;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::plot_adapter::PlotterAdapter;
use crate::adapters::random_forest::RandomForest;
use crate::adapters::synthetic_adapter::SyntheticAdapter;
use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::error::AutotradeError;
use crate::domain::features::{build_features, min_bars_required, FEATURE_COLUMNS};
use crate::domain::metrics::{ClassificationReport, PerformanceSummary};
use crate::domain::ohlcv::ensure_chronological;
use crate::domain::period::Period;
use crate::domain::pipeline_config::{DataConfig, DataSource, PipelineConfig};
use crate::domain::training::{ensure_trainable, train_model};
use crate::ports::classifier_port::Classifier;
use crate::ports::data_port::DataPort;
use crate::ports::plot_port::PlotPort;

#[derive(Parser, Debug)]
#[command(
    name = "autotrade",
    about = "Train a next-day direction classifier on daily bars and backtest its signals"
)]
pub struct Cli {
    /// Ticker symbol
    #[arg(default_value = "AAPL")]
    pub ticker: String,
    /// Look-back period: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd or max
    #[arg(default_value = "2y")]
    pub period: String,
    /// INI configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Validate the configuration and period, then exit
    #[arg(long)]
    pub dry_run: bool,
}

/// What a successful pipeline run produced.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub bars: usize,
    pub feature_rows: usize,
    pub accuracy: f64,
    pub report: ClassificationReport,
    pub backtest: BacktestResult,
    /// First date of the held-out partition.
    pub test_start: Option<NaiveDate>,
    pub out_of_sample_return: f64,
    pub importances: Vec<(String, f64)>,
}

pub fn run(cli: Cli) -> ExitCode {
    match run_cli(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_cli(cli: &Cli) -> Result<(), AutotradeError> {
    let period: Period = cli.period.parse()?;
    let config = load_pipeline_config(cli.config.as_deref())?;

    if cli.dry_run {
        println!("Config validated successfully");
        println!("  ticker: {}, period: {}", cli.ticker, period);
        println!("  data source: {:?}", config.data.source);
        println!("  plot: {}", config.report.output_path.display());
        return Ok(());
    }

    let data_port = build_data_port(&config.data)?;
    let classifier = RandomForest::new(config.model);
    let plot_port = PlotterAdapter::default();

    run_pipeline(
        data_port.as_ref(),
        classifier,
        &plot_port,
        &config,
        &cli.ticker,
        period,
    )?;
    Ok(())
}

/// Defaults when no file is given, otherwise the validated file contents.
pub fn load_pipeline_config(path: Option<&Path>) -> Result<PipelineConfig, AutotradeError> {
    match path {
        Some(path) => {
            println!("Loading config from {}", path.display());
            let adapter = FileConfigAdapter::from_file(path)?;
            PipelineConfig::from_port(&adapter)
        }
        None => Ok(PipelineConfig::default()),
    }
}

pub fn build_data_port(config: &DataConfig) -> Result<Box<dyn DataPort>, AutotradeError> {
    match config.source {
        DataSource::Yahoo => yahoo_port(),
        DataSource::Csv => Ok(Box::new(CsvAdapter::new(config.csv_dir.clone()))),
        DataSource::Synthetic => Ok(Box::new(SyntheticAdapter::new(
            config.synthetic_rows,
            config.synthetic_seed,
        ))),
    }
}

#[cfg(feature = "yahoo")]
fn yahoo_port() -> Result<Box<dyn DataPort>, AutotradeError> {
    use crate::adapters::yahoo_adapter::YahooAdapter;
    Ok(Box::new(YahooAdapter::new()?))
}

#[cfg(not(feature = "yahoo"))]
fn yahoo_port() -> Result<Box<dyn DataPort>, AutotradeError> {
    Err(AutotradeError::ConfigInvalid {
        section: "data".into(),
        key: "source".into(),
        reason: "built without the yahoo feature".into(),
    })
}

/// Fetch, build features, train, backtest, then export and plot.
///
/// Every fatal error surfaces before anything is written to disk.
pub fn run_pipeline<C: Classifier>(
    data_port: &dyn DataPort,
    classifier: C,
    plot_port: &dyn PlotPort,
    config: &PipelineConfig,
    ticker: &str,
    period: Period,
) -> Result<PipelineOutcome, AutotradeError> {
    // Stage 1: Fetch bars
    println!("Fetching {} daily bars for {}...", period, ticker);
    let bars = data_port.fetch_bars(ticker, period)?;
    if bars.is_empty() {
        return Err(AutotradeError::DataUnavailable {
            symbol: ticker.to_string(),
            period: period.to_string(),
        });
    }
    ensure_chronological(&bars)?;

    // Stage 2: Features
    let table = build_features(&bars);
    println!(
        "Built {} feature rows from {} bars (at least {} bars needed)",
        table.len(),
        bars.len(),
        min_bars_required()
    );
    ensure_trainable(&table)?;

    // Stage 3: Train and evaluate
    let training = train_model(&table, classifier, &config.training)?;
    let test_start = training.test.first_date();
    println!(
        "Trained on {} rows, tested on {} rows",
        training.train.len(),
        training.test.len()
    );
    println!("\nTest accuracy: {:.4}\n", training.accuracy);
    println!("{}", training.report);

    // Stage 4: Backtest over the full table
    let backtest = run_backtest(&table, &training.model, config.risk_free_rate)?;
    let out_of_sample_return = test_start.map_or(0.0, |d| backtest.return_since(d));
    print_summary(&backtest.summary, out_of_sample_return, test_start);

    let importances: Vec<(String, f64)> = FEATURE_COLUMNS
        .iter()
        .zip(training.model.feature_importances())
        .map(|(name, &value)| (name.to_string(), value))
        .collect();

    // Stage 5: Outputs
    if let Some(csv_path) = &config.report.csv_path {
        write_backtest_csv(csv_path, &backtest)?;
        println!("Backtest rows written to: {}", csv_path.display());
    }

    let named: Vec<(&str, f64)> = importances.iter().map(|(n, v)| (n.as_str(), *v)).collect();
    plot_port.render(&backtest, &named, &config.report.output_path)?;
    println!("Plot written to: {}", config.report.output_path.display());

    Ok(PipelineOutcome {
        bars: bars.len(),
        feature_rows: table.len(),
        accuracy: training.accuracy,
        report: training.report,
        backtest,
        test_start,
        out_of_sample_return,
        importances,
    })
}

fn print_summary(summary: &PerformanceSummary, out_of_sample: f64, test_start: Option<NaiveDate>) {
    println!("=== Backtest (all rows) ===");
    println!("Strategy Return:  {:.2}%", summary.total_return * 100.0);
    println!("Buy and Hold:     {:.2}%", summary.buy_and_hold_return * 100.0);
    println!("Annualized:       {:.2}%", summary.annualized_return * 100.0);
    println!("Sharpe Ratio:     {:.2}", summary.sharpe_ratio);
    println!("Max Drawdown:     -{:.1}%", summary.max_drawdown * 100.0);
    println!("Exposure:         {:.1}%", summary.exposure * 100.0);
    println!("Trading Days:     {}", summary.trading_days);
    if let Some(date) = test_start {
        println!(
            "Out-of-sample:    {:.2}% (from {})",
            out_of_sample * 100.0,
            date
        );
    }
}
