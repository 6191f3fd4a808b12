#![allow(dead_code)]

use autotrade::domain::backtest::BacktestResult;
use autotrade::domain::error::AutotradeError;
pub use autotrade::domain::ohlcv::OhlcvBar;
use autotrade::domain::period::Period;
use autotrade::domain::pipeline_config::PipelineConfig;
use autotrade::ports::data_port::DataPort;
use autotrade::ports::plot_port::PlotPort;
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub requests: RefCell<Vec<(String, Period)>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str, period: Period) -> Result<Vec<OhlcvBar>, AutotradeError> {
        self.requests.borrow_mut().push((symbol.to_string(), period));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(AutotradeError::Fetch {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

/// Records render calls instead of drawing.
#[derive(Default)]
pub struct MockPlotPort {
    pub calls: RefCell<Vec<RenderCall>>,
}

#[derive(Debug, Clone)]
pub struct RenderCall {
    pub rows: usize,
    pub importances: Vec<(String, f64)>,
    pub output_path: PathBuf,
}

impl PlotPort for MockPlotPort {
    fn render(
        &self,
        result: &BacktestResult,
        importances: &[(&str, f64)],
        output_path: &Path,
    ) -> Result<(), AutotradeError> {
        self.calls.borrow_mut().push(RenderCall {
            rows: result.rows.len(),
            importances: importances
                .iter()
                .map(|(n, v)| (n.to_string(), *v))
                .collect(),
            output_path: output_path.to_path_buf(),
        });
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(symbol: &str, date: NaiveDate, close: f64) -> OhlcvBar {
    OhlcvBar {
        symbol: symbol.to_string(),
        date,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000_000,
    }
}

/// Bars on consecutive calendar days from `prices`.
pub fn bars_from_prices(symbol: &str, prices: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2023, 1, 2);
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| make_bar(symbol, start + chrono::Duration::days(i as i64), p))
        .collect()
}

/// A deterministic wave with drift; never flat, never negative.
pub fn wave_prices(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + t * 0.05 + (t * 0.3).sin() * 3.0 + (t * 0.07).cos() * 2.0
        })
        .collect()
}

/// Pipeline settings with a small forest and plot/csv paths under `dir`.
pub fn test_config(dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.model.n_trees = 15;
    config.report.output_path = dir.join("img/analysis.png");
    config
}
