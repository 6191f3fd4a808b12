//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod features;
pub mod indicator;
pub mod metrics;
pub mod ohlcv;
pub mod period;
pub mod pipeline_config;
pub mod synthetic;
pub mod training;
