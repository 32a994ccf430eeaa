//! Exact Shapley attribution over the feature coalition space.
//!
//! With only 5 features the 2^5 coalitions are enumerated exactly instead of
//! sampled. The value of a coalition S is the mean model score over
//! composites that take features in S from the instance and the rest from
//! each background row; contributions therefore sum to
//! `score(instance) - mean score(background)` and share the model's sign
//! convention (positive = pushes toward anomalous).

use ndarray::{ArrayView2, Axis};

use crate::features::layout::{FEATURE_COUNT, FEATURE_LAYOUT};
use crate::model::forest::IsolationForest;

use super::types::{zero_contributions, Attribution, ContributionMap};

const COALITIONS: usize = 1 << FEATURE_COUNT;

/// Attribute a standardized instance's score to its features.
///
/// Never fails: any internal fault (unfit model, degenerate background,
/// non-finite arithmetic) is logged and degraded to zero contributions.
pub fn explain(
    forest: &IsolationForest,
    instance: &[f64; FEATURE_COUNT],
    background: ArrayView2<f64>,
) -> Attribution {
    match shapley_values(forest, instance, background) {
        Ok(phi) => {
            let map: ContributionMap = FEATURE_LAYOUT
                .iter()
                .zip(phi.iter())
                .map(|(name, value)| ((*name).to_string(), *value))
                .collect();
            Attribution::Explained(map)
        }
        Err(reason) => {
            log::warn!("attribution failed, substituting zero contributions: {reason}");
            Attribution::FellBackToZero(zero_contributions())
        }
    }
}

fn shapley_values(
    forest: &IsolationForest,
    instance: &[f64; FEATURE_COUNT],
    background: ArrayView2<f64>,
) -> Result<[f64; FEATURE_COUNT], String> {
    let rows = background.nrows();
    if rows == 0 {
        return Err("empty background sample".to_string());
    }
    if background.ncols() != FEATURE_COUNT {
        return Err(format!(
            "background has {} columns, expected {FEATURE_COUNT}",
            background.ncols()
        ));
    }

    // Mean score per coalition mask; bit j set = feature j from the instance.
    let mut values = [0.0_f64; COALITIONS];
    let mut composite = [0.0_f64; FEATURE_COUNT];
    for (mask, slot) in values.iter_mut().enumerate() {
        let mut acc = 0.0;
        for row in background.axis_iter(Axis(0)) {
            for j in 0..FEATURE_COUNT {
                composite[j] = if mask & (1 << j) != 0 { instance[j] } else { row[j] };
            }
            acc += forest
                .decision_function(&composite)
                .map_err(|e| e.to_string())?;
        }
        *slot = acc / rows as f64;
        if !slot.is_finite() {
            return Err(format!("non-finite value for coalition {mask:#07b}"));
        }
    }

    let mut phi = [0.0_f64; FEATURE_COUNT];
    for (j, phi_j) in phi.iter_mut().enumerate() {
        for mask in 0..COALITIONS {
            if mask & (1 << j) != 0 {
                continue;
            }
            let size = mask.count_ones() as usize;
            let weight =
                factorial(size) * factorial(FEATURE_COUNT - 1 - size) / factorial(FEATURE_COUNT);
            *phi_j += weight * (values[mask | (1 << j)] - values[mask]);
        }
        if !phi_j.is_finite() {
            return Err(format!("non-finite contribution for feature {j}"));
        }
    }

    Ok(phi)
}

fn factorial(n: usize) -> f64 {
    (1..=n).product::<usize>() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{generate, SyntheticConfig};
    use crate::model::forest::ForestConfig;
    use crate::model::scaler::StandardScaler;
    use ndarray::Array2;

    fn fitted_forest() -> (IsolationForest, Array2<f64>) {
        let corpus = generate(&SyntheticConfig {
            normal_samples: 500,
            anomaly_samples: 20,
            seed: 42,
        });
        let mut scaler = StandardScaler::new();
        scaler.fit(corpus.view());
        let scaled = scaler.transform_matrix(corpus.view()).unwrap();

        let mut forest = IsolationForest::new(ForestConfig {
            n_estimators: 30,
            max_samples: 128,
            ..Default::default()
        });
        forest.fit(&scaled).unwrap();

        // Small standardized background drawn from the scaled corpus.
        let background = scaled.slice(ndarray::s![0..50, ..]).to_owned();
        (forest, background)
    }

    #[test]
    fn test_explained_map_has_all_schema_keys() {
        let (forest, background) = fitted_forest();
        let attribution = explain(&forest, &[3.0, -2.0, 0.0, 0.5, 0.5], background.view());
        assert!(attribution.was_explained());
        let map = attribution.into_map();
        assert_eq!(map.len(), FEATURE_COUNT);
        for name in FEATURE_LAYOUT {
            assert!(map.contains_key(*name));
        }
    }

    #[test]
    fn test_contributions_sum_to_score_minus_baseline() {
        let (forest, background) = fitted_forest();
        let instance = [4.0, -1.5, 0.2, 0.1, -0.3];

        let score = forest.decision_function(&instance).unwrap();
        let baseline: f64 = background
            .axis_iter(Axis(0))
            .map(|row| {
                let mut point = [0.0; FEATURE_COUNT];
                for j in 0..FEATURE_COUNT {
                    point[j] = row[j];
                }
                forest.decision_function(&point).unwrap()
            })
            .sum::<f64>()
            / background.nrows() as f64;

        let map = explain(&forest, &instance, background.view()).into_map();
        let total: f64 = map.values().sum();
        assert!(
            (total - (score - baseline)).abs() < 1e-9,
            "sum {total:.6} vs score-baseline {:.6}",
            score - baseline
        );
    }

    #[test]
    fn test_empty_background_falls_back_to_zero() {
        let (forest, _) = fitted_forest();
        let empty = Array2::<f64>::zeros((0, FEATURE_COUNT));
        let attribution = explain(&forest, &[0.0; FEATURE_COUNT], empty.view());
        assert!(!attribution.was_explained());
        let map = attribution.into_map();
        assert_eq!(map.len(), FEATURE_COUNT);
        assert!(map.values().all(|v| *v == 0.0));
    }

    #[test]
    fn test_unfit_model_falls_back_to_zero() {
        let forest = IsolationForest::new(ForestConfig::default());
        let background = Array2::<f64>::zeros((10, FEATURE_COUNT));
        let attribution = explain(&forest, &[0.0; FEATURE_COUNT], background.view());
        assert!(!attribution.was_explained());
    }

    #[test]
    fn test_dominant_feature_gets_largest_contribution() {
        let (forest, background) = fitted_forest();
        // Extreme standardized amount, everything else typical.
        let instance = [8.0, 0.0, 0.0, 0.0, 0.0];
        let map = explain(&forest, &instance, background.view()).into_map();
        let amount = map["amount"].abs();
        for name in ["hour", "day_of_week", "merchant_category", "transaction_type"] {
            assert!(
                amount >= map[name].abs(),
                "amount |{amount:.4}| should dominate {name} |{:.4}|",
                map[name]
            );
        }
        assert!(map["amount"] > 0.0, "extreme amount should push toward anomalous");
    }
}
