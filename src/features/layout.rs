//! Feature Layout - Centralized Feature Definition
//!
//! Single source of truth for the transaction feature schema. The scaler,
//! the forest and the attribution engine all assume this exact order.

/// Feature names in the exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    "amount",            // 0: transaction amount, float >= 0
    "hour",              // 1: hour of day, 0-23
    "day_of_week",       // 2: Monday=0 .. Sunday=6
    "merchant_category", // 3: bounded non-negative code
    "transaction_type",  // 4: bounded non-negative code
];

/// Total number of features
pub const FEATURE_COUNT: usize = 5;

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}
