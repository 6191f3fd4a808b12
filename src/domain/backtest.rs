//! Long/flat backtest driven by classifier signals.
//!
//! A signal produced on day t (using that day's close) is acted upon over the
//! following day, so day t's strategy return is `return_1d[t] * signal[t-1]`.
//! The first row has no prior signal and earns nothing.

use crate::domain::error::AutotradeError;
use crate::domain::features::FeatureTable;
use crate::domain::metrics::{compound, PerformanceSummary};
use crate::ports::classifier_port::Classifier;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestRow {
    pub date: NaiveDate,
    pub close: f64,
    pub return_1d: f64,
    pub signal: u8,
    pub strategy_return: f64,
    pub cumulative_return: f64,
    /// Buy-and-hold compounding of `return_1d` over the same rows.
    pub market_cumulative_return: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub rows: Vec<BacktestRow>,
    pub summary: PerformanceSummary,
}

impl BacktestResult {
    pub fn final_cumulative_return(&self) -> f64 {
        self.rows.last().map_or(0.0, |r| r.cumulative_return)
    }

    /// Compounded strategy return over rows dated on or after `date`.
    pub fn return_since(&self, date: NaiveDate) -> f64 {
        let returns: Vec<f64> = self
            .rows
            .iter()
            .filter(|r| r.date >= date)
            .map(|r| r.strategy_return)
            .collect();
        compound(&returns)
    }
}

/// Score every row of `table` with `model` and account the resulting returns.
pub fn run_backtest(
    table: &FeatureTable,
    model: &dyn Classifier,
    risk_free_rate: f64,
) -> Result<BacktestResult, AutotradeError> {
    if table.is_empty() {
        return Err(AutotradeError::InsufficientHistory {
            rows: 0,
            minimum: 1,
        });
    }

    let signals = model.predict(&table.features());
    if signals.len() != table.len() {
        return Err(AutotradeError::Model {
            reason: format!(
                "classifier returned {} signals for {} rows",
                signals.len(),
                table.len()
            ),
        });
    }

    let returns: Vec<f64> = table.rows.iter().map(|r| r.return_1d).collect();
    let rows = account(table, &signals);

    let strategy_returns: Vec<f64> = rows.iter().map(|r| r.strategy_return).collect();
    let mut market_returns = returns;
    market_returns[0] = 0.0;
    let positions: Vec<u8> = std::iter::once(0)
        .chain(signals.iter().take(signals.len() - 1).copied())
        .collect();

    let summary =
        PerformanceSummary::compute(&strategy_returns, &market_returns, &positions, risk_free_rate);

    info!(
        rows = rows.len(),
        total_return = summary.total_return,
        buy_and_hold = summary.buy_and_hold_return,
        "backtest complete"
    );

    Ok(BacktestResult { rows, summary })
}

fn account(table: &FeatureTable, signals: &[u8]) -> Vec<BacktestRow> {
    let mut rows = Vec::with_capacity(table.len());
    let mut equity = 1.0;
    let mut market_equity = 1.0;

    for (i, row) in table.rows.iter().enumerate() {
        let (strategy_return, market_return) = if i == 0 {
            (0.0, 0.0)
        } else {
            (row.return_1d * f64::from(signals[i - 1]), row.return_1d)
        };
        equity *= 1.0 + strategy_return;
        market_equity *= 1.0 + market_return;

        rows.push(BacktestRow {
            date: row.date,
            close: row.close,
            return_1d: row.return_1d,
            signal: signals[i],
            strategy_return,
            cumulative_return: equity - 1.0,
            market_cumulative_return: market_equity - 1.0,
        });
    }

    rows
}
