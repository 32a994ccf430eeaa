//! Transaction feature vector - the fixed-schema input to the pipeline.

use serde::{Deserialize, Serialize};

use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT};

/// A fully validated transaction in the fixed 5-feature schema.
///
/// Produced by [`super::normalize::normalize`]; all fields are guaranteed
/// present and numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionFeatures {
    pub amount: f64,
    pub hour: i64,
    pub day_of_week: i64,
    pub merchant_category: i64,
    pub transaction_type: i64,
}

impl TransactionFeatures {
    /// Values in [`FEATURE_LAYOUT`] order, as the numeric pipeline expects.
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.amount,
            self.hour as f64,
            self.day_of_week as f64,
            self.merchant_category as f64,
            self.transaction_type as f64,
        ]
    }

    /// Get a feature value by schema name.
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).map(|i| self.to_array()[i])
    }

    /// Feature names for this vector.
    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }
}
