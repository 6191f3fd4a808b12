//! Typed pipeline settings built from a `ConfigPort`.

use crate::domain::config_validation::validate_pipeline_config;
use crate::domain::error::AutotradeError;
use crate::domain::training::{TrainConfig, DEFAULT_TEST_RATIO};
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_PATH: &str = "docs/img/autotrade_analysis.png";
pub const DEFAULT_CSV_DIR: &str = "data";
pub const DEFAULT_SYNTHETIC_ROWS: usize = 300;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Yahoo,
    Csv,
    Synthetic,
}

impl DataSource {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "yahoo" => Some(DataSource::Yahoo),
            "csv" => Some(DataSource::Csv),
            "synthetic" => Some(DataSource::Synthetic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub source: DataSource,
    pub csv_dir: PathBuf,
    pub synthetic_rows: usize,
    pub synthetic_seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Yahoo,
            csv_dir: PathBuf::from(DEFAULT_CSV_DIR),
            synthetic_rows: DEFAULT_SYNTHETIC_ROWS,
            synthetic_seed: DEFAULT_SEED,
        }
    }
}

/// Random-forest hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 10,
            min_samples_split: 5,
            min_samples_leaf: 2,
            seed: DEFAULT_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub output_path: PathBuf,
    pub csv_path: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            csv_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub training: TrainConfig,
    pub model: ModelConfig,
    pub risk_free_rate: f64,
    pub report: ReportConfig,
}

impl PipelineConfig {
    /// Validate `config` and read it, filling absent keys with defaults.
    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, AutotradeError> {
        validate_pipeline_config(config)?;

        let data_defaults = DataConfig::default();
        let model_defaults = ModelConfig::default();
        let report_defaults = ReportConfig::default();

        let source = non_empty(config, "data", "source")
            .and_then(|s| DataSource::parse(&s))
            .unwrap_or(data_defaults.source);

        let data = DataConfig {
            source,
            csv_dir: non_empty(config, "data", "csv_dir")
                .map(PathBuf::from)
                .unwrap_or(data_defaults.csv_dir),
            synthetic_rows: get_usize(
                config,
                "data",
                "synthetic_rows",
                data_defaults.synthetic_rows,
            ),
            synthetic_seed: get_u64(
                config,
                "data",
                "synthetic_seed",
                data_defaults.synthetic_seed,
            ),
        };

        let model = ModelConfig {
            n_trees: get_usize(config, "model", "n_trees", model_defaults.n_trees),
            max_depth: get_usize(config, "model", "max_depth", model_defaults.max_depth),
            min_samples_split: get_usize(
                config,
                "model",
                "min_samples_split",
                model_defaults.min_samples_split,
            ),
            min_samples_leaf: get_usize(
                config,
                "model",
                "min_samples_leaf",
                model_defaults.min_samples_leaf,
            ),
            seed: get_u64(config, "model", "seed", model_defaults.seed),
        };

        let report = ReportConfig {
            output_path: non_empty(config, "report", "output_path")
                .map(PathBuf::from)
                .unwrap_or(report_defaults.output_path),
            csv_path: non_empty(config, "report", "csv_path").map(PathBuf::from),
        };

        Ok(Self {
            data,
            training: TrainConfig {
                test_ratio: config.get_double("training", "test_ratio", DEFAULT_TEST_RATIO),
            },
            model,
            risk_free_rate: config.get_double("backtest", "risk_free_rate", 0.0),
            report,
        })
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// Validation has already rejected negatives, so the conversions only fall
// back on values too large for the target type.
fn get_usize(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> usize {
    usize::try_from(config.get_int(section, key, default as i64)).unwrap_or(default)
}

fn get_u64(config: &dyn ConfigPort, section: &str, key: &str, default: u64) -> u64 {
    u64::try_from(config.get_int(section, key, default as i64)).unwrap_or(default)
}
