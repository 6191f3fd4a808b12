//! Feature table construction.
//!
//! Turns a bar series into one `FeatureRow` per date that has full history.
//! Feature columns only look at data up to and including their own date; the
//! `target` label is the single exception and looks exactly one bar ahead.

use crate::domain::indicator::{
    calculate_macd_default, calculate_rolling_std, calculate_rsi, calculate_sma, macd,
    IndicatorType,
};
use crate::domain::ohlcv::{closes, OhlcvBar};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

pub const SMA_SHORT: usize = 10;
pub const SMA_LONG: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const VOLATILITY_WINDOW: usize = 10;

pub const FEATURE_COUNT: usize = 8;

/// Model input columns, in the order `FeatureRow::features` emits them.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "sma_10",
    "sma_50",
    "rsi_14",
    "macd",
    "macd_signal",
    "macd_hist",
    "return_1d",
    "volatility_10d",
];

/// Indicators computed by `build_features`.
pub const INDICATORS: [IndicatorType; 5] = [
    IndicatorType::Sma(SMA_SHORT),
    IndicatorType::Sma(SMA_LONG),
    IndicatorType::Rsi(RSI_PERIOD),
    IndicatorType::Macd {
        fast: macd::DEFAULT_FAST,
        slow: macd::DEFAULT_SLOW,
        signal: macd::DEFAULT_SIGNAL,
    },
    IndicatorType::Stddev(VOLATILITY_WINDOW),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub close: f64,
    pub sma_10: f64,
    pub sma_50: f64,
    pub rsi_14: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub return_1d: f64,
    pub volatility_10d: f64,
    pub target: u8,
}

impl FeatureRow {
    pub fn features(&self) -> Vec<f64> {
        vec![
            self.sma_10,
            self.sma_50,
            self.rsi_14,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.return_1d,
            self.volatility_10d,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row-major feature matrix in `FEATURE_COLUMNS` order.
    pub fn features(&self) -> Vec<Vec<f64>> {
        self.rows.iter().map(FeatureRow::features).collect()
    }

    pub fn labels(&self) -> Vec<u8> {
        self.rows.iter().map(|r| r.target).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }
}

/// Minimum number of bars that can produce at least one feature row: the
/// longest indicator warm-up, the row's own bar, and one bar of label
/// lookahead.
pub fn min_bars_required() -> usize {
    let warmup = INDICATORS.iter().map(IndicatorType::warmup).max().unwrap_or(0);
    warmup + 2
}

pub fn build_features(bars: &[OhlcvBar]) -> FeatureTable {
    let close = closes(bars);
    let n = close.len();

    let sma_short = calculate_sma(&close, SMA_SHORT);
    let sma_long = calculate_sma(&close, SMA_LONG);
    let rsi = calculate_rsi(&close, RSI_PERIOD);
    let macd = calculate_macd_default(&close);

    let return_1d: Vec<Option<f64>> = (0..n)
        .map(|i| (i > 0).then(|| close[i] / close[i - 1] - 1.0))
        .collect();
    let volatility = calculate_rolling_std(&return_1d, VOLATILITY_WINDOW);

    // the only forward-looking column
    let target: Vec<Option<u8>> = (0..n)
        .map(|i| (i + 1 < n).then(|| u8::from(close[i + 1] > close[i])))
        .collect();

    let mut rows = Vec::with_capacity(n.saturating_sub(SMA_LONG));
    for (i, bar) in bars.iter().enumerate() {
        let row = (|| {
            Some(FeatureRow {
                date: bar.date,
                close: bar.close,
                sma_10: sma_short[i]?,
                sma_50: sma_long[i]?,
                rsi_14: rsi[i],
                macd: macd.line[i],
                macd_signal: macd.signal[i],
                macd_hist: macd.histogram[i],
                return_1d: return_1d[i]?,
                volatility_10d: volatility[i]?,
                target: target[i]?,
            })
        })();

        if let Some(row) = row.filter(|r| r.features().iter().all(|v| v.is_finite())) {
            rows.push(row);
        }
    }

    debug!(
        bars = n,
        rows = rows.len(),
        indicators = ?INDICATORS.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "built feature table"
    );

    FeatureTable { rows }
}
