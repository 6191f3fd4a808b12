//! Binary classifier port trait.

use crate::domain::error::AutotradeError;

/// A fit/predict model over row-major feature matrices with 0/1 labels.
pub trait Classifier {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> Result<(), AutotradeError>;

    /// One 0/1 prediction per input row.
    fn predict(&self, features: &[Vec<f64>]) -> Vec<u8>;

    /// Per-feature importance scores aligned to the training column order.
    /// Empty before `fit`.
    fn feature_importances(&self) -> &[f64];
}
