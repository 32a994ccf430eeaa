//! Features Module - Transaction Feature Schema & Normalization
//!
//! Maps arbitrary transaction payloads to the fixed 5-feature schema and
//! provides the stable categorical encoding for free-text fields.

pub mod encoding;
pub mod layout;
pub mod normalize;
pub mod vector;


// Re-export common types
pub use layout::{feature_index, feature_name, FEATURE_COUNT, FEATURE_LAYOUT};
pub use normalize::normalize;
pub use vector::TransactionFeatures;
