//! Standard scaler - zero mean, unit variance per feature column.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::features::layout::FEATURE_COUNT;

/// Per-column standardization fitted once on the training distribution.
///
/// `transform` before `fit` fails with [`ModelError::ScalerNotFitted`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardScaler {
    stats: Option<ColumnStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnStats {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    pub fn new() -> Self {
        Self { stats: None }
    }

    pub fn is_fitted(&self) -> bool {
        self.stats.is_some()
    }

    /// Compute and store per-column mean and population standard deviation.
    ///
    /// Zero-variance columns store scale 1.0 so transform never divides by
    /// zero.
    pub fn fit(&mut self, x: ArrayView2<f64>) {
        let n = x.nrows();
        let mut mean = [0.0; FEATURE_COUNT];
        let mut scale = [1.0; FEATURE_COUNT];

        if n > 0 {
            for (j, column) in x.columns().into_iter().enumerate().take(FEATURE_COUNT) {
                let m = column.sum() / n as f64;
                let variance = column.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n as f64;
                let std = variance.sqrt();
                mean[j] = m;
                scale[j] = if std > 0.0 { std } else { 1.0 };
            }
        }

        self.stats = Some(ColumnStats { mean, scale });
    }

    /// Standardize a single feature vector.
    pub fn transform(&self, row: &[f64; FEATURE_COUNT]) -> Result<[f64; FEATURE_COUNT], ModelError> {
        let stats = self.stats.as_ref().ok_or(ModelError::ScalerNotFitted)?;
        let mut out = [0.0; FEATURE_COUNT];
        for j in 0..FEATURE_COUNT {
            out[j] = (row[j] - stats.mean[j]) / stats.scale[j];
        }
        Ok(out)
    }

    /// Standardize a whole matrix (training-time path).
    pub fn transform_matrix(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, ModelError> {
        let stats = self.stats.as_ref().ok_or(ModelError::ScalerNotFitted)?;
        let mut out = x.to_owned();
        for mut row in out.rows_mut() {
            for j in 0..FEATURE_COUNT.min(row.len()) {
                row[j] = (row[j] - stats.mean[j]) / stats.scale[j];
            }
        }
        Ok(out)
    }
}
