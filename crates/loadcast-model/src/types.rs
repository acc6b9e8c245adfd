//! Model artifacts and the immutable `ModelState` pairing them.
//!
//! The serialized shapes of `LinearModel` and `Scaler` are the on-disk
//! format. No schema version is stored.

use serde::{Deserialize, Serialize};

use loadcast_core::{FEATURE_COUNT, FeatureVector};

use crate::error::{ModelError, ModelResult};
use crate::regression;

/// Per-feature standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: [f64; FEATURE_COUNT],
    pub scale: [f64; FEATURE_COUNT],
}

impl Scaler {
    /// Fit population mean and standard deviation per column.
    ///
    /// Constant columns get `scale = 1.0`, so they standardize to zero
    /// instead of dividing by zero.
    pub fn fit(rows: &[FeatureVector]) -> ModelResult<Self> {
        if rows.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        let n = rows.len() as f64;

        let mut mean = [0.0; FEATURE_COUNT];
        for row in rows {
            for (m, x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = [0.0; FEATURE_COUNT];
        for row in rows {
            for ((v, x), m) in var.iter_mut().zip(row).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }
        var.iter_mut().for_each(|v| *v /= n);

        let mut scale = [1.0; FEATURE_COUNT];
        for ((s, v), m) in scale.iter_mut().zip(&var).zip(&mean) {
            if !is_constant(*v, *m, n) {
                *s = v.sqrt();
            }
        }

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, o) in out.iter_mut().enumerate() {
            *o = (row[i] - self.mean[i]) / self.scale[i];
        }
        out
    }

    pub fn transform_all(&self, rows: &[FeatureVector]) -> Vec<FeatureVector> {
        rows.iter().map(|row| self.transform(row)).collect()
    }
}

/// A column counts as constant when its variance is within accumulated
/// rounding error of zero.
fn is_constant(var: f64, mean: f64, n: f64) -> bool {
    let eps = f64::EPSILON;
    var <= n * eps * var + (n * mean * eps).powi(2)
}

/// Linear regression over standardized features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: [f64; FEATURE_COUNT],
    pub intercept: f64,
}

impl LinearModel {
    pub fn predict(&self, scaled: &FeatureVector) -> f64 {
        self.weights
            .iter()
            .zip(scaled)
            .fold(self.intercept, |acc, (w, x)| acc + w * x)
    }
}

/// One training generation: a model and the scaler it was fitted with.
///
/// Never mutated after construction; the store replaces it wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelState {
    pub model: LinearModel,
    pub scaler: Scaler,
}

impl ModelState {
    /// Standardize `features`, then fit OLS of `targets` on them.
    pub fn fit(features: &[FeatureVector], targets: &[f64]) -> ModelResult<Self> {
        if features.len() != targets.len() {
            return Err(ModelError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }
        let scaler = Scaler::fit(features)?;
        let scaled = scaler.transform_all(features);
        let model = regression::fit_ols(&scaled, targets)?;
        Ok(Self { model, scaler })
    }

    /// Raw (unclamped) prediction for one unscaled feature vector.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        self.model.predict(&self.scaler.transform(features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaler_standardizes_varying_column() {
        let rows = vec![
            [1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            [3.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        ];
        let scaler = Scaler::fit(&rows).unwrap();
        assert_eq!(scaler.mean[0], 2.0);
        assert_eq!(scaler.scale[0], 1.0);
        assert_eq!(scaler.transform(&rows[0])[0], -1.0);
        assert_eq!(scaler.transform(&rows[1])[0], 1.0);
    }

    #[test]
    fn constant_column_gets_identity_scale() {
        let rows = vec![[0.5; FEATURE_COUNT]; 4];
        let scaler = Scaler::fit(&rows).unwrap();
        assert_eq!(scaler.scale, [1.0; FEATURE_COUNT]);
        let out = scaler.transform(&rows[0]);
        assert!(out.iter().all(|v| v.is_finite() && *v == 0.0));
    }

    #[test]
    fn constant_test_is_relative_to_rounding_not_absolute() {
        // Repeated 0.1 leaves round-off variance; still constant.
        let mut rows = vec![[0.0; FEATURE_COUNT]; 10];
        for row in &mut rows {
            row[0] = 0.1;
        }
        // A genuine spread far below 1e-12 is still a real spread.
        rows[0][1] = 2e-13;

        let scaler = Scaler::fit(&rows).unwrap();
        assert_eq!(scaler.scale[0], 1.0);
        assert!(scaler.scale[1] > 0.0 && scaler.scale[1] < 1e-12);
        assert!(is_constant(0.0, 5.0, 12.0));
        assert!(!is_constant(1e-30, 0.0, 12.0));
    }

    #[test]
    fn scaler_rejects_empty_input() {
        assert!(matches!(Scaler::fit(&[]), Err(ModelError::EmptyTrainingSet)));
    }

    #[test]
    fn linear_model_evaluates_dot_product_plus_intercept() {
        let model = LinearModel {
            weights: [1.0, 2.0, 0.0, 0.0, 0.0, -1.0],
            intercept: 5.0,
        };
        assert_eq!(model.predict(&[1.0, 1.0, 9.0, 9.0, 9.0, 2.0]), 6.0);
    }

    #[test]
    fn fit_rejects_mismatched_lengths() {
        let err = ModelState::fit(&[[0.0; FEATURE_COUNT]; 3], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ModelError::LengthMismatch { features: 3, targets: 2 }));
    }

    #[test]
    fn artifacts_serialize_as_flat_records() {
        let model = LinearModel {
            weights: [0.0; FEATURE_COUNT],
            intercept: 1.5,
        };
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["weights"].as_array().unwrap().len(), FEATURE_COUNT);
        assert_eq!(json["intercept"], 1.5);

        let bad = r#"{"mean":[0,0,0],"scale":[1,1,1]}"#;
        assert!(serde_json::from_str::<Scaler>(bad).is_err());
    }
}
