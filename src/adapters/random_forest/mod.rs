//! Random-forest classifier adapter.
//!
//! Bagged CART trees: each tree sees a bootstrap resample of the training
//! rows and considers `floor(sqrt(n_features))` random features per split.
//! Predictions are a majority vote. Tree `i` draws from its own ChaCha8 stream
//! seeded with `seed + i`, so the fitted forest does not depend on how rayon
//! schedules the work.

mod tree;

use crate::domain::error::AutotradeError;
use crate::domain::pipeline_config::ModelConfig;
use crate::ports::classifier_port::Classifier;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::info;
use tree::{normalize, DecisionTree, TreeParams};

pub struct RandomForest {
    config: ModelConfig,
    trees: Vec<DecisionTree>,
    importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            importances: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Fraction of trees voting for class 1.
    pub fn predict_proba(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let votes = self.trees.iter().filter(|t| t.predict_one(row) == 1).count();
        votes as f64 / self.trees.len() as f64
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

fn check_training_input(features: &[Vec<f64>], labels: &[u8]) -> Result<usize, AutotradeError> {
    if features.is_empty() {
        return Err(AutotradeError::Model {
            reason: "cannot fit on an empty training set".into(),
        });
    }
    if features.len() != labels.len() {
        return Err(AutotradeError::Model {
            reason: format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            ),
        });
    }
    let n_features = features[0].len();
    if n_features == 0 || features.iter().any(|row| row.len() != n_features) {
        return Err(AutotradeError::Model {
            reason: "feature rows must be non-empty and equally long".into(),
        });
    }
    if let Some(label) = labels.iter().find(|&&l| l > 1) {
        return Err(AutotradeError::Model {
            reason: format!("labels must be 0 or 1, found {}", label),
        });
    }
    Ok(n_features)
}

impl Classifier for RandomForest {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> Result<(), AutotradeError> {
        let n_features = check_training_input(features, labels)?;
        let n_rows = features.len();
        let config = self.config;

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            min_samples_leaf: config.min_samples_leaf,
            max_features: ((n_features as f64).sqrt() as usize).max(1),
        };

        let trees: Vec<DecisionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let sample: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
                DecisionTree::fit(features, labels, &sample, &params, rng)
            })
            .collect();

        let mut importances = vec![0.0; n_features];
        for tree in &trees {
            for (total, &imp) in importances.iter_mut().zip(tree.importances()) {
                *total += imp;
            }
        }
        normalize(&mut importances);

        info!(
            trees = trees.len(),
            rows = n_rows,
            max_features = params.max_features,
            max_depth = trees.iter().map(DecisionTree::depth).max().unwrap_or(0),
            "fitted random forest"
        );

        self.trees = trees;
        self.importances = importances;
        Ok(())
    }

    fn predict(&self, features: &[Vec<f64>]) -> Vec<u8> {
        features
            .par_iter()
            .map(|row| u8::from(self.predict_proba(row) > 0.5))
            .collect()
    }

    fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}
