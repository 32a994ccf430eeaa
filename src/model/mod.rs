//! Model Module - Scaling & Outlier Detection
//!
//! Standardization of raw feature vectors and the isolation-forest ensemble
//! that scores them. Both are fit once and read-only afterwards.

pub mod forest;
pub mod scaler;

// Re-export common types
pub use forest::{ForestConfig, IsolationForest};
pub use scaler::StandardScaler;
