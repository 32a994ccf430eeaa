//! Attribution result types.

use std::collections::BTreeMap;

use crate::features::layout::FEATURE_LAYOUT;

/// Per-feature signed contributions. Always carries exactly the schema
/// feature names as keys. Positive = pushes toward anomalous.
pub type ContributionMap = BTreeMap<String, f64>;

/// Internal attribution outcome; collapsed to a plain map at the public
/// boundary.
#[derive(Debug, Clone)]
pub enum Attribution {
    /// Exact additive decomposition succeeded.
    Explained(ContributionMap),
    /// Computation failed; every contribution substituted with zero.
    FellBackToZero(ContributionMap),
}

impl Attribution {
    pub fn was_explained(&self) -> bool {
        matches!(self, Attribution::Explained(_))
    }

    pub fn into_map(self) -> ContributionMap {
        match self {
            Attribution::Explained(map) | Attribution::FellBackToZero(map) => map,
        }
    }
}

/// Zero contribution for every schema feature.
pub fn zero_contributions() -> ContributionMap {
    FEATURE_LAYOUT
        .iter()
        .map(|name| ((*name).to_string(), 0.0))
        .collect()
}
