//! Synthetic training-set generator.
//!
//! Bulk of the corpus is normal traffic centered at amount 50 during
//! daytime hours, with a small injected block of anomalies (high amounts,
//! night hours) so the contamination threshold has something to cut at.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::features::layout::FEATURE_COUNT;

/// Hours used for the injected unusual-hour anomalies.
const ANOMALY_HOURS: [f64; 4] = [2.0, 3.0, 4.0, 23.0];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub normal_samples: usize,
    pub anomaly_samples: usize,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            normal_samples: 10_000,
            anomaly_samples: 200,
            seed: 42,
        }
    }
}

/// Generate the training matrix, shape `(normal + anomaly, FEATURE_COUNT)`.
///
/// Deterministic for a given seed.
pub fn generate(config: &SyntheticConfig) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let total = config.normal_samples + config.anomaly_samples;
    let mut data = Array2::<f64>::zeros((total, FEATURE_COUNT));

    for i in 0..config.normal_samples {
        let mut row = data.row_mut(i);
        row[0] = sample_normal(&mut rng, 50.0, 30.0).abs();
        row[1] = sample_normal(&mut rng, 14.0, 4.0).clamp(0.0, 23.0);
        row[2] = f64::from(rng.gen_range(0..7u32));
        row[3] = f64::from(rng.gen_range(0..10u32));
        row[4] = f64::from(rng.gen_range(0..3u32));
    }

    for i in 0..config.anomaly_samples {
        let mut row = data.row_mut(config.normal_samples + i);
        row[0] = sample_normal(&mut rng, 500.0, 200.0).abs();
        row[1] = ANOMALY_HOURS[rng.gen_range(0..ANOMALY_HOURS.len())];
        row[2] = f64::from(rng.gen_range(0..7u32));
        row[3] = f64::from(rng.gen_range(0..10u32));
        row[4] = f64::from(rng.gen_range(0..3u32));
    }

    data
}

/// Gaussian sample via the Box-Muller transform.
pub(crate) fn sample_normal(rng: &mut StdRng, mean: f64, std: f64) -> f64 {
    // 1 - u keeps the argument of ln() away from zero.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + std * z
}
