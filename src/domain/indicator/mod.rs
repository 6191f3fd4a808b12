//! Technical indicator implementations.
//!
//! Every indicator takes a price series (`&[f64]`, one value per bar) and
//! returns output of the same length, aligned index for index:
//! - `Vec<Option<f64>>` where a warm-up prefix is undefined (`None`)
//! - `Vec<f64>` where the indicator is defined from the first bar onward
//!
//! `IndicatorType` names an indicator together with its parameters.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use ema::calculate_ema;
pub use macd::{calculate_macd, calculate_macd_default, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_rolling_std;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Stddev(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

impl IndicatorType {
    /// Number of leading bars for which the indicator is undefined.
    ///
    /// RSI, EMA and MACD are defined from the first bar (RSI by forcing its
    /// warm-up to 100), so their warm-up is zero.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(period) | IndicatorType::Stddev(period) => {
                period.saturating_sub(1)
            }
            IndicatorType::Ema(_) | IndicatorType::Rsi(_) | IndicatorType::Macd { .. } => 0,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}
