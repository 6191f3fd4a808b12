//! Concrete adapter implementations for ports.

pub mod backtest_csv;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod plot_adapter;
pub mod random_forest;
pub mod synthetic_adapter;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;
