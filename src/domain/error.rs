//! Domain error types.

/// Top-level error type for autotrade.
#[derive(Debug, thiserror::Error)]
pub enum AutotradeError {
    #[error("no data for {symbol} over period {period}")]
    DataUnavailable { symbol: String, period: String },

    #[error("insufficient history: have {rows} feature rows, need at least {minimum}")]
    InsufficientHistory { rows: usize, minimum: usize },

    #[error("invalid split configuration: {reason}")]
    InvalidSplitConfiguration { reason: String },

    #[error("invalid look-back period '{value}'")]
    InvalidPeriod { value: String },

    #[error("fetch error: {reason}")]
    Fetch { reason: String },

    #[error("data format error: {reason}")]
    DataFormat { reason: String },

    #[error("model error: {reason}")]
    Model { reason: String },

    #[error("plot error: {reason}")]
    Plot { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&AutotradeError> for std::process::ExitCode {
    fn from(err: &AutotradeError) -> Self {
        let code: u8 = match err {
            AutotradeError::Io(_) | AutotradeError::Plot { .. } => 1,
            AutotradeError::ConfigParse { .. }
            | AutotradeError::ConfigMissing { .. }
            | AutotradeError::ConfigInvalid { .. }
            | AutotradeError::InvalidPeriod { .. } => 2,
            AutotradeError::Fetch { .. } | AutotradeError::DataFormat { .. } => 3,
            AutotradeError::InvalidSplitConfiguration { .. } | AutotradeError::Model { .. } => 4,
            AutotradeError::DataUnavailable { .. } | AutotradeError::InsufficientHistory { .. } => {
                5
            }
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::ExitCode;

    #[test]
    fn data_unavailable_message_names_symbol_and_period() {
        let err = AutotradeError::DataUnavailable {
            symbol: "ZZZZ".into(),
            period: "2y".into(),
        };
        assert_eq!(err.to_string(), "no data for ZZZZ over period 2y");
    }

    #[test]
    fn insufficient_history_message() {
        let err = AutotradeError::InsufficientHistory {
            rows: 0,
            minimum: 2,
        };
        assert!(err.to_string().contains("have 0 feature rows"));
    }

    #[test]
    fn exit_codes_group_by_category() {
        let split = AutotradeError::InvalidSplitConfiguration {
            reason: "x".into(),
        };
        let data = AutotradeError::DataUnavailable {
            symbol: "A".into(),
            period: "1y".into(),
        };
        assert_eq!(ExitCode::from(&split), ExitCode::from(4));
        assert_eq!(ExitCode::from(&data), ExitCode::from(5));
    }
}
