//! Isolation Forest - unsupervised outlier ensemble.
//!
//! Anomalies are easier to isolate with random axis-aligned splits and thus
//! have shorter average path lengths across the trees.
//!
//! Score convention: `2^(-E[h(x)] / c(m))`, in (0, 1), higher = more
//! anomalous. The decision threshold is the `(1 - contamination)` quantile
//! of the training-set scores, captured once at fit time.

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::features::layout::FEATURE_COUNT;

/// Euler-Mascheroni constant, for the expected-path-length formula.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Ensemble size.
    pub n_estimators: usize,
    /// Rows subsampled (with replacement) per tree.
    pub max_samples: usize,
    /// Expected anomaly proportion; only picks the decision threshold.
    pub contamination: f64,
    /// Seed for reproducible training.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.1,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsolationForest {
    config: ForestConfig,
    trees: Vec<IsolationTree>,
    sample_size: usize,
    /// c(sample_size), the normalization for the score exponent.
    path_norm: f64,
    threshold: f64,
    trained: bool,
}

impl IsolationForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            sample_size: 0,
            path_norm: 0.0,
            threshold: 0.0,
            trained: false,
        }
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Decision threshold captured at fit time (0.0 before fit).
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Expected path length of an unsuccessful BST search, c(n).
    fn average_path_length(n: usize) -> f64 {
        match n {
            0 | 1 => 0.0,
            2 => 1.0,
            _ => {
                let n = n as f64;
                2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
            }
        }
    }

    /// Build the ensemble and cache the contamination threshold.
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<(), ModelError> {
        let rows = x.nrows();
        if rows == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        self.sample_size = self.config.max_samples.min(rows);
        self.path_norm = Self::average_path_length(self.sample_size);
        let max_depth = (self.sample_size as f64).log2().ceil().max(1.0) as usize;

        self.trees.clear();
        for _ in 0..self.config.n_estimators {
            // Subsample rows with replacement.
            let sample: Vec<Vec<f64>> = (0..self.sample_size)
                .map(|_| {
                    let idx = rng.gen_range(0..rows);
                    x.row(idx).to_vec()
                })
                .collect();

            self.trees.push(IsolationTree::build(&sample, max_depth, &mut rng));
        }
        self.trained = true;

        // Threshold = (1 - contamination) quantile of training scores.
        let mut scores: Vec<f64> = x
            .axis_iter(Axis(0))
            .map(|row| self.score_sample(&row.to_vec()))
            .collect();
        scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let q = (1.0 - self.config.contamination).clamp(0.0, 1.0);
        let idx = ((q * rows as f64).ceil() as usize)
            .saturating_sub(1)
            .min(rows - 1);
        self.threshold = scores[idx];

        log::debug!(
            "isolation forest fit: {} trees, sample size {}, threshold {:.4}",
            self.trees.len(),
            self.sample_size,
            self.threshold
        );
        Ok(())
    }

    /// Anomaly score in (0, 1); higher = more anomalous.
    pub fn decision_function(&self, row: &[f64; FEATURE_COUNT]) -> Result<f64, ModelError> {
        if !self.trained {
            return Err(ModelError::NotFitted);
        }
        Ok(self.score_sample(row))
    }

    /// Whether the score exceeds the contamination threshold.
    pub fn predict(&self, row: &[f64; FEATURE_COUNT]) -> Result<bool, ModelError> {
        Ok(self.decision_function(row)? > self.threshold)
    }

    fn score_sample(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() || self.path_norm <= 0.0 {
            return 0.5;
        }
        let total: f64 = self.trees.iter().map(|tree| tree.path_length(row)).sum();
        let avg_path = total / self.trees.len() as f64;
        2.0_f64.powf(-avg_path / self.path_norm)
    }
}

/// A single isolation tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IsolationTree {
    root: Option<Box<IsolationNode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum IsolationNode {
    Internal {
        feature_idx: usize,
        split_value: f64,
        left: Option<Box<IsolationNode>>,
        right: Option<Box<IsolationNode>>,
    },
    Leaf {
        size: usize,
    },
}

impl IsolationTree {
    fn build(samples: &[Vec<f64>], max_depth: usize, rng: &mut StdRng) -> Self {
        Self {
            root: Self::build_node(samples, 0, max_depth, rng),
        }
    }

    fn build_node(
        samples: &[Vec<f64>],
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> Option<Box<IsolationNode>> {
        if samples.is_empty() {
            return None;
        }
        if depth >= max_depth || samples.len() <= 1 {
            return Some(Box::new(IsolationNode::Leaf { size: samples.len() }));
        }

        let feature_idx = rng.gen_range(0..FEATURE_COUNT);

        let mut min_val = f64::MAX;
        let mut max_val = f64::MIN;
        for sample in samples {
            if let Some(&val) = sample.get(feature_idx) {
                min_val = min_val.min(val);
                max_val = max_val.max(val);
            }
        }

        // Constant feature in this partition, cannot split.
        if (max_val - min_val).abs() < f64::EPSILON {
            return Some(Box::new(IsolationNode::Leaf { size: samples.len() }));
        }

        let split_value = rng.gen_range(min_val..max_val);

        let (left_samples, right_samples): (Vec<Vec<f64>>, Vec<Vec<f64>>) =
            samples.iter().cloned().partition(|s| {
                s.get(feature_idx).map(|&v| v < split_value).unwrap_or(true)
            });

        let left = Self::build_node(&left_samples, depth + 1, max_depth, rng);
        let right = Self::build_node(&right_samples, depth + 1, max_depth, rng);

        Some(Box::new(IsolationNode::Internal {
            feature_idx,
            split_value,
            left,
            right,
        }))
    }

    fn path_length(&self, sample: &[f64]) -> f64 {
        match &self.root {
            None => 0.0,
            Some(node) => Self::node_path_length(node, sample, 0),
        }
    }

    fn node_path_length(node: &IsolationNode, sample: &[f64], depth: usize) -> f64 {
        match node {
            IsolationNode::Leaf { size } => {
                // Correction for branches terminated before full isolation.
                depth as f64 + IsolationForest::average_path_length(*size)
            }
            IsolationNode::Internal {
                feature_idx,
                split_value,
                left,
                right,
            } => {
                let val = sample.get(*feature_idx).copied().unwrap_or(0.0);
                let next = if val < *split_value { left } else { right };
                match next {
                    Some(n) => Self::node_path_length(n, sample, depth + 1),
                    None => depth as f64 + 1.0,
                }
            }
        }
    }
}
