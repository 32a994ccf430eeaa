//! Explain Module - Additive Feature Attribution
//!
//! Decomposes a single anomaly score into per-feature contributions relative
//! to a background sample. Attribution never fails a scoring request: any
//! internal fault degrades to an all-zero contribution map.

pub mod engine;
pub mod types;

pub use engine::explain;
pub use types::{Attribution, ContributionMap};
