//! Scoring Pipeline - normalize, scale, score, explain.
//!
//! [`ScoringPipeline::train`] runs the synthetic generator, fits the scaler
//! and the forest, and draws the attribution background. The result is
//! immutable and safe to share across threads by reference.

use chrono::{DateTime, Utc};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dataset::synthetic::{self, SyntheticConfig};
use crate::error::{ModelError, ScoreError};
use crate::explain::{self, ContributionMap};
use crate::features::layout::FEATURE_COUNT;
use crate::features::normalize::normalize;
use crate::features::vector::TransactionFeatures;
use crate::model::forest::{ForestConfig, IsolationForest};
use crate::model::scaler::StandardScaler;

/// Decorrelates the background RNG stream from the training stream.
const BACKGROUND_SEED_SALT: u64 = 0x5eed_bac6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub synthetic: SyntheticConfig,
    pub forest: ForestConfig,
    /// Rows in the attribution background sample.
    pub background_samples: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            synthetic: SyntheticConfig::default(),
            forest: ForestConfig::default(),
            background_samples: 100,
        }
    }
}

/// Coarse risk bucket derived from the score's distance past the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// One scored transaction. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Anomaly score in (0, 1); higher = more anomalous.
    pub score: f64,
    pub is_anomaly: bool,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    /// Per-feature additive contributions; always all 5 schema keys.
    pub explanation: ContributionMap,
    pub timestamp: DateTime<Utc>,
}

/// One entry of a batch response; order and count match the request.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub index: usize,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Scored(ScoreResult),
    Failed { error: String },
}

/// The trained scoring pipeline. Read-only after construction.
#[derive(Debug, Clone)]
pub struct ScoringPipeline {
    scaler: StandardScaler,
    forest: IsolationForest,
    background: Array2<f64>,
    trained_at: DateTime<Utc>,
}

impl ScoringPipeline {
    /// Train scaler and forest on a fresh synthetic corpus.
    pub fn train(config: &PipelineConfig) -> Result<Self, ModelError> {
        let corpus = synthetic::generate(&config.synthetic);

        let mut scaler = StandardScaler::new();
        scaler.fit(corpus.view());
        let scaled = scaler.transform_matrix(corpus.view())?;

        let mut forest = IsolationForest::new(config.forest.clone());
        forest.fit(&scaled)?;

        let background =
            draw_background(config.background_samples, config.forest.seed ^ BACKGROUND_SEED_SALT);

        log::info!(
            "scoring pipeline trained: {} rows, {} trees, threshold {:.4}",
            corpus.nrows(),
            forest.tree_count(),
            forest.threshold()
        );

        Ok(Self {
            scaler,
            forest,
            background,
            trained_at: Utc::now(),
        })
    }

    /// Score a raw payload; fails only on validation.
    pub fn score(&self, payload: &Value) -> Result<ScoreResult, ScoreError> {
        let features = normalize(payload)?;
        Ok(self.score_features(&features)?)
    }

    /// Score an already-normalized transaction.
    pub fn score_features(&self, features: &TransactionFeatures) -> Result<ScoreResult, ModelError> {
        let scaled = self.scaler.transform(&features.to_array())?;
        let score = self.forest.decision_function(&scaled)?;
        let threshold = self.forest.threshold();
        let is_anomaly = score > threshold;

        let explanation = explain::explain(&self.forest, &scaled, self.background.view()).into_map();

        let distance = (score - threshold).abs() / threshold.max(f64::EPSILON);
        let confidence = (0.5 + distance * 0.5).min(1.0);

        let risk_level = if !is_anomaly {
            RiskLevel::Low
        } else if score > threshold + (1.0 - threshold) / 2.0 {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        };

        Ok(ScoreResult {
            score,
            is_anomaly,
            confidence,
            risk_level,
            explanation,
            timestamp: Utc::now(),
        })
    }

    /// Score a batch with per-item error isolation: one item's failure never
    /// aborts the rest, and every output carries its input index.
    pub fn score_batch(&self, payloads: &[Value]) -> Vec<BatchItem> {
        payloads
            .iter()
            .enumerate()
            .map(|(index, payload)| {
                let outcome = match self.score(payload) {
                    Ok(result) => BatchOutcome::Scored(result),
                    Err(err) => {
                        log::debug!("batch item {index} rejected: {err}");
                        BatchOutcome::Failed {
                            error: err.to_string(),
                        }
                    }
                };
                BatchItem { index, outcome }
            })
            .collect()
    }

    pub fn threshold(&self) -> f64 {
        self.forest.threshold()
    }

    pub fn tree_count(&self) -> usize {
        self.forest.tree_count()
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }
}

/// Standard-normal background in standardized feature space.
fn draw_background(rows: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut background = Array2::<f64>::zeros((rows, FEATURE_COUNT));
    for mut row in background.rows_mut() {
        for value in row.iter_mut() {
            *value = synthetic::sample_normal(&mut rng, 0.0, 1.0);
        }
    }
    background
}
