//! Service surface - process-wide pipeline with initialize-once semantics.
//!
//! Training happens at most once per process, on the first call that needs
//! the model; concurrent first calls block on the same initialization
//! instead of racing to retrain. The trained pipeline is read-only and
//! shared without further locking.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ModelError, ScoreError};
use crate::pipeline::{BatchItem, BatchOutcome, PipelineConfig, ScoreResult, ScoringPipeline};

static PIPELINE: OnceCell<ScoringPipeline> = OnceCell::new();

// Scoring counters for the status report.
static SCORED: AtomicU64 = AtomicU64::new(0);
static ANOMALIES: AtomicU64 = AtomicU64::new(0);
static LAST_SCORED: Mutex<Option<DateTime<Utc>>> = Mutex::new(None);

/// Train the shared pipeline if it has not been trained yet. Idempotent.
pub fn ensure_initialized() -> Result<&'static ScoringPipeline, ModelError> {
    PIPELINE.get_or_try_init(|| ScoringPipeline::train(&PipelineConfig::default()))
}

/// Score a single raw payload with the shared pipeline.
pub fn score(payload: &Value) -> Result<ScoreResult, ScoreError> {
    let pipeline = ensure_initialized()?;
    let result = pipeline.score(payload)?;
    record_outcome(&result);
    Ok(result)
}

/// Score a batch with the shared pipeline; per-item error isolation.
pub fn score_batch(payloads: &[Value]) -> Result<Vec<BatchItem>, ModelError> {
    let pipeline = ensure_initialized()?;
    let items = pipeline.score_batch(payloads);
    for item in &items {
        if let BatchOutcome::Scored(result) = &item.outcome {
            record_outcome(result);
        }
    }
    Ok(items)
}

fn record_outcome(result: &ScoreResult) {
    SCORED.fetch_add(1, Ordering::Relaxed);
    if result.is_anomaly {
        ANOMALIES.fetch_add(1, Ordering::Relaxed);
    }
    *LAST_SCORED.lock() = Some(result.timestamp);
}

/// Snapshot of the shared pipeline's state for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub model_loaded: bool,
    pub trained_at: Option<DateTime<Utc>>,
    pub tree_count: usize,
    pub threshold: f64,
    pub scored_count: u64,
    pub anomaly_count: u64,
    pub last_scored_at: Option<DateTime<Utc>>,
}

pub fn status() -> PipelineStatus {
    let pipeline = PIPELINE.get();
    PipelineStatus {
        model_loaded: pipeline.is_some(),
        trained_at: pipeline.map(ScoringPipeline::trained_at),
        tree_count: pipeline.map_or(0, ScoringPipeline::tree_count),
        threshold: pipeline.map_or(0.0, ScoringPipeline::threshold),
        scored_count: SCORED.load(Ordering::Relaxed),
        anomaly_count: ANOMALIES.load(Ordering::Relaxed),
        last_scored_at: *LAST_SCORED.lock(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // These tests share the process-wide pipeline; they assert properties
    // that hold regardless of execution order.

    #[test]
    fn test_ensure_initialized_is_idempotent() {
        let first = ensure_initialized().unwrap() as *const ScoringPipeline;
        let second = ensure_initialized().unwrap() as *const ScoringPipeline;
        assert_eq!(first, second, "second call must not retrain");
    }

    #[test]
    fn test_repeat_scores_identical_after_reinit() {
        let payload = json!({
            "amount": 60.0, "hour": 13, "day_of_week": 2,
            "merchant_category": 4, "transaction_type": 0,
        });
        let a = score(&payload).unwrap();
        ensure_initialized().unwrap();
        let b = score(&payload).unwrap();
        assert_eq!(a.score, b.score);
        assert_eq!(a.is_anomaly, b.is_anomaly);
        assert_eq!(a.explanation, b.explanation);
    }

    #[test]
    fn test_status_reflects_scoring() {
        let payload = json!({
            "amount": 45.0, "hour": 15, "day_of_week": 1,
            "merchant_category": 2, "transaction_type": 1,
        });
        score(&payload).unwrap();

        let snapshot = status();
        assert!(snapshot.model_loaded);
        assert!(snapshot.trained_at.is_some());
        assert!(snapshot.tree_count > 0);
        assert!(snapshot.threshold > 0.0);
        assert!(snapshot.scored_count >= 1);
        assert!(snapshot.last_scored_at.is_some());
    }
}
