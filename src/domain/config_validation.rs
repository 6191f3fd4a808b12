//! Configuration validation.
//!
//! Validates every recognised key before the pipeline runs. Missing keys are
//! accepted (they take their defaults); present keys must parse and lie in
//! range.

use crate::domain::error::AutotradeError;
use crate::ports::config_port::ConfigPort;

pub const DATA_SOURCES: [&str; 3] = ["yahoo", "csv", "synthetic"];

pub fn validate_pipeline_config(config: &dyn ConfigPort) -> Result<(), AutotradeError> {
    validate_data_config(config)?;
    validate_training_config(config)?;
    validate_model_config(config)?;
    validate_backtest_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), AutotradeError> {
    validate_source(config)?;
    validate_synthetic_rows(config)?;
    ensure_int(config, "data", "synthetic_seed")?;
    Ok(())
}

pub fn validate_training_config(config: &dyn ConfigPort) -> Result<(), AutotradeError> {
    validate_test_ratio(config)
}

pub fn validate_model_config(config: &dyn ConfigPort) -> Result<(), AutotradeError> {
    validate_min_int(config, "model", "n_trees", 1)?;
    validate_min_int(config, "model", "max_depth", 1)?;
    validate_min_int(config, "model", "min_samples_split", 2)?;
    validate_min_int(config, "model", "min_samples_leaf", 1)?;
    validate_min_int(config, "model", "seed", 0)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), AutotradeError> {
    validate_risk_free_rate(config)
}

fn validate_source(config: &dyn ConfigPort) -> Result<(), AutotradeError> {
    match config.get_string("data", "source") {
        Some(s) if !DATA_SOURCES.contains(&s.trim().to_lowercase().as_str()) => {
            Err(AutotradeError::ConfigInvalid {
                section: "data".to_string(),
                key: "source".to_string(),
                reason: format!("source must be one of {}", DATA_SOURCES.join(", ")),
            })
        }
        _ => Ok(()),
    }
}

fn validate_synthetic_rows(config: &dyn ConfigPort) -> Result<(), AutotradeError> {
    validate_min_int(config, "data", "synthetic_rows", 1)
}

fn validate_test_ratio(config: &dyn ConfigPort) -> Result<(), AutotradeError> {
    ensure_double(config, "training", "test_ratio")?;
    let value = config.get_double("training", "test_ratio", 0.2);
    if !(value > 0.0 && value < 1.0) {
        return Err(AutotradeError::ConfigInvalid {
            section: "training".to_string(),
            key: "test_ratio".to_string(),
            reason: "test_ratio must be strictly between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), AutotradeError> {
    ensure_double(config, "backtest", "risk_free_rate")?;
    let value = config.get_double("backtest", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(AutotradeError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_min_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    minimum: i64,
) -> Result<(), AutotradeError> {
    ensure_int(config, section, key)?;
    let value = config.get_int(section, key, minimum);
    if value < minimum {
        return Err(AutotradeError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{} must be at least {}", key, minimum),
        });
    }
    Ok(())
}

// The numeric getters fall back to their default on garbage, so a present
// but malformed value has to be caught from the raw string.
fn ensure_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), AutotradeError> {
    match config.get_string(section, key) {
        Some(s) if s.trim().parse::<i64>().is_err() => Err(AutotradeError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("'{}' is not an integer", s),
        }),
        _ => Ok(()),
    }
}

fn ensure_double(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), AutotradeError> {
    match config.get_string(section, key) {
        Some(s) if s.trim().parse::<f64>().is_err() => Err(AutotradeError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("'{}' is not a number", s),
        }),
        _ => Ok(()),
    }
}
