//! SecureFlow Scoring Core
//!
//! Scores financial transactions for anomalousness and explains each score.
//! The pipeline is: normalize a raw payload into the fixed 5-feature schema,
//! standardize it with a scaler fitted on synthetic training data, score it
//! with an isolation-forest ensemble, and decompose the score into additive
//! per-feature contributions.
//!
//! The trained model is immutable after [`pipeline::ScoringPipeline::train`]
//! and safe to share across threads. [`service`] holds a process-wide
//! instance behind an initialize-once gate for callers that do not want to
//! manage the pipeline themselves.
//!
//! Score convention: higher = more anomalous, in (0, 1). A transaction is
//! flagged when its score exceeds the contamination threshold captured at
//! fit time.

pub mod dataset;
pub mod error;
pub mod explain;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod service;

pub use error::{ModelError, ScoreError, ValidationError};
pub use features::{normalize, TransactionFeatures, FEATURE_COUNT, FEATURE_LAYOUT};
pub use pipeline::{BatchItem, BatchOutcome, PipelineConfig, RiskLevel, ScoreResult, ScoringPipeline};
pub use service::{ensure_initialized, score, score_batch, status, PipelineStatus};
