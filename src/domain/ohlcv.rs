//! OHLCV bar representation.

use crate::domain::error::AutotradeError;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Closing prices in bar order.
pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Sort bars by date and drop duplicate dates, keeping the last record seen.
pub fn normalize(mut bars: Vec<OhlcvBar>) -> Vec<OhlcvBar> {
    // stable sort keeps input order among equal dates
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<OhlcvBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(prev) if prev.date == bar.date => *prev = bar,
            _ => out.push(bar),
        }
    }
    out
}

/// Dates must be strictly increasing.
pub fn ensure_chronological(bars: &[OhlcvBar]) -> Result<(), AutotradeError> {
    for w in bars.windows(2) {
        if w[1].date <= w[0].date {
            return Err(AutotradeError::DataFormat {
                reason: format!(
                    "bars out of order: {} follows {}",
                    w[1].date, w[0].date
                ),
            });
        }
    }
    Ok(())
}
