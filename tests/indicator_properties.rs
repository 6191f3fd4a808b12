//! Property tests for indicators, feature construction and backtest accounting.

mod common;

use autotrade::domain::backtest::run_backtest;
use autotrade::domain::error::AutotradeError;
use autotrade::domain::features::{build_features, FeatureTable, FEATURE_COLUMNS};
use autotrade::domain::indicator::macd::calculate_macd_default;
use autotrade::domain::indicator::rsi::calculate_rsi;
use autotrade::domain::indicator::sma::calculate_sma;
use autotrade::ports::classifier_port::Classifier;
use common::*;
use proptest::prelude::*;

/// Replays a fixed signal per row, ignoring the features.
struct Replay(Vec<u8>, Vec<f64>);

impl Classifier for Replay {
    fn fit(&mut self, _features: &[Vec<f64>], _labels: &[u8]) -> Result<(), AutotradeError> {
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> Vec<u8> {
        self.0.iter().copied().take(features.len()).collect()
    }

    fn feature_importances(&self) -> &[f64] {
        &self.1
    }
}

fn prices(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..500.0, min_len..max_len)
}

proptest! {
    #[test]
    fn sma_warmup_then_window_mean(series in prices(1, 80), period in 1usize..20) {
        let sma = calculate_sma(&series, period);
        prop_assert_eq!(sma.len(), series.len());
        for (i, value) in sma.iter().enumerate() {
            if i + 1 < period {
                prop_assert!(value.is_none());
            } else {
                let window = &series[i + 1 - period..=i];
                let mean = window.iter().sum::<f64>() / period as f64;
                prop_assert!((value.unwrap() - mean).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn rsi_stays_in_range(series in prices(0, 120), period in 1usize..30) {
        let rsi = calculate_rsi(&series, period);
        prop_assert_eq!(rsi.len(), series.len());
        prop_assert!(rsi.iter().all(|v| (0.0..=100.0).contains(v)));
    }

    #[test]
    fn rsi_of_rising_series_is_100(
        start in 1.0f64..100.0,
        step in 0.01f64..5.0,
        n in 1usize..60,
    ) {
        let series: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
        prop_assert!(calculate_rsi(&series, 14).iter().all(|&v| v == 100.0));
    }

    #[test]
    fn macd_columns_match_input(series in prices(0, 100)) {
        let macd = calculate_macd_default(&series);
        prop_assert_eq!(macd.line.len(), series.len());
        prop_assert_eq!(macd.signal.len(), series.len());
        prop_assert_eq!(macd.histogram.len(), series.len());
        for i in 0..macd.len() {
            prop_assert!((macd.histogram[i] - (macd.line[i] - macd.signal[i])).abs() < 1e-9);
        }
    }

    #[test]
    fn feature_rows_are_finite_and_fewer_than_bars(series in prices(0, 140)) {
        let bars = bars_from_prices("PROP", &series);
        let table = build_features(&bars);

        prop_assert_eq!(table.len(), series.len().saturating_sub(50));
        prop_assert!(table.len() < series.len() || series.is_empty());
        for row in &table.rows {
            prop_assert!(row.features().iter().all(|v| v.is_finite()));
            prop_assert!(row.target <= 1);
        }
    }

    #[test]
    fn backtest_compounds_lagged_signals(
        series in prices(55, 120),
        signals in prop::collection::vec(0u8..=1, 70),
    ) {
        let table: FeatureTable = build_features(&bars_from_prices("PROP", &series));
        let model = Replay(signals, vec![0.0; FEATURE_COLUMNS.len()]);
        let result = run_backtest(&table, &model, 0.0).unwrap();

        prop_assert_eq!(result.rows.len(), table.len());
        prop_assert_eq!(result.rows[0].strategy_return, 0.0);
        prop_assert_eq!(result.rows[0].market_cumulative_return, 0.0);

        let mut equity = 1.0;
        for (i, row) in result.rows.iter().enumerate() {
            let expected = if i == 0 {
                0.0
            } else {
                row.return_1d * result.rows[i - 1].signal as f64
            };
            prop_assert_eq!(row.strategy_return, expected);
            equity *= 1.0 + row.strategy_return;
            prop_assert!((row.cumulative_return - (equity - 1.0)).abs() < 1e-9);
        }
    }
}
