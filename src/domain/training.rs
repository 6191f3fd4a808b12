//! Temporal train/test partitioning and model evaluation.
//!
//! The split is a single chronological cut: every training row is dated
//! strictly before every test row. Rows are never shuffled, since the rolling
//! features of neighbouring days overlap and a random split would leak future
//! information into training.

use crate::domain::error::AutotradeError;
use crate::domain::features::{FeatureRow, FeatureTable};
use crate::domain::metrics::ClassificationReport;
use crate::ports::classifier_port::Classifier;
use chrono::NaiveDate;
use tracing::info;

pub const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Smallest table that can form both partitions.
pub const MIN_TRAINING_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    pub test_ratio: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            test_ratio: DEFAULT_TEST_RATIO,
        }
    }
}

/// One partition of the feature table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub dates: Vec<NaiveDate>,
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
}

impl Dataset {
    fn from_rows(rows: &[FeatureRow]) -> Self {
        Self {
            dates: rows.iter().map(|r| r.date).collect(),
            features: rows.iter().map(FeatureRow::features).collect(),
            labels: rows.iter().map(|r| r.target).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemporalSplit {
    pub train: Dataset,
    pub test: Dataset,
    pub split_index: usize,
}

pub struct TrainingResult<C> {
    pub model: C,
    pub train: Dataset,
    pub test: Dataset,
    pub predictions: Vec<u8>,
    pub accuracy: f64,
    pub report: ClassificationReport,
}

/// Reject an empty or too-small feature table before any fitting happens.
pub fn ensure_trainable(table: &FeatureTable) -> Result<(), AutotradeError> {
    if table.len() < MIN_TRAINING_ROWS {
        return Err(AutotradeError::InsufficientHistory {
            rows: table.len(),
            minimum: MIN_TRAINING_ROWS,
        });
    }
    Ok(())
}

pub fn temporal_split(
    table: &FeatureTable,
    test_ratio: f64,
) -> Result<TemporalSplit, AutotradeError> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(AutotradeError::InvalidSplitConfiguration {
            reason: format!("test_ratio must lie in (0, 1), got {}", test_ratio),
        });
    }
    ensure_trainable(table)?;

    let n = table.len();
    let split_index = (n as f64 * (1.0 - test_ratio)).floor() as usize;
    if split_index == 0 || split_index >= n {
        return Err(AutotradeError::InvalidSplitConfiguration {
            reason: format!(
                "test_ratio {} leaves an empty partition for {} rows",
                test_ratio, n
            ),
        });
    }

    let (train_rows, test_rows) = table.rows.split_at(split_index);
    Ok(TemporalSplit {
        train: Dataset::from_rows(train_rows),
        test: Dataset::from_rows(test_rows),
        split_index,
    })
}

/// Fit `classifier` on the earliest rows and score it on the rest.
pub fn train_model<C: Classifier>(
    table: &FeatureTable,
    mut classifier: C,
    config: &TrainConfig,
) -> Result<TrainingResult<C>, AutotradeError> {
    let TemporalSplit { train, test, .. } = temporal_split(table, config.test_ratio)?;

    info!(
        train_rows = train.len(),
        test_rows = test.len(),
        train_end = ?train.last_date(),
        test_start = ?test.first_date(),
        "temporal split"
    );

    classifier.fit(&train.features, &train.labels)?;
    let predictions = classifier.predict(&test.features);
    if predictions.len() != test.len() {
        return Err(AutotradeError::Model {
            reason: format!(
                "classifier returned {} predictions for {} rows",
                predictions.len(),
                test.len()
            ),
        });
    }

    let report = ClassificationReport::compute(&test.labels, &predictions);

    Ok(TrainingResult {
        model: classifier,
        train,
        test,
        predictions,
        accuracy: report.accuracy,
        report,
    })
}
