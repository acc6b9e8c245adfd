//! Ordinary least squares with intercept.
//!
//! Features and target are centred, then the weights are the
//! minimum-norm least-squares solution from an SVD pseudo-inverse.
//! Rank-deficient designs (constant columns, fewer rows than features)
//! therefore get zero weight on the unidentifiable directions instead of
//! failing.

use nalgebra::{DMatrix, DVector};

use loadcast_core::{FEATURE_COUNT, FeatureVector};

use crate::error::{ModelError, ModelResult};
use crate::types::LinearModel;

/// Fit `targets ≈ X·w + b` over already-standardized rows.
pub fn fit_ols(rows: &[FeatureVector], targets: &[f64]) -> ModelResult<LinearModel> {
    if rows.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    if rows.len() != targets.len() {
        return Err(ModelError::LengthMismatch {
            features: rows.len(),
            targets: targets.len(),
        });
    }
    if rows.iter().flatten().chain(targets).any(|v| !v.is_finite()) {
        return Err(ModelError::Fit("non-finite training value".to_string()));
    }

    let n = rows.len();
    let x_offset = column_means(rows);
    let y_offset = targets.iter().sum::<f64>() / n as f64;

    let x = DMatrix::from_fn(n, FEATURE_COUNT, |r, c| rows[r][c] - x_offset[c]);
    let y = DVector::from_iterator(n, targets.iter().map(|t| t - y_offset));

    let svd = x.svd(true, true);
    let max_singular = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = max_singular * f64::EPSILON * n.max(FEATURE_COUNT) as f64;
    let solution = svd
        .solve(&y, cutoff)
        .map_err(|e| ModelError::Fit(e.to_string()))?;

    let mut weights = [0.0; FEATURE_COUNT];
    for (w, s) in weights.iter_mut().zip(solution.iter()) {
        *w = *s;
    }
    let intercept = y_offset
        - weights
            .iter()
            .zip(&x_offset)
            .map(|(w, m)| w * m)
            .sum::<f64>();

    if weights.iter().any(|w| !w.is_finite()) || !intercept.is_finite() {
        return Err(ModelError::Fit("solution is not finite".to_string()));
    }

    Ok(LinearModel { weights, intercept })
}

fn column_means(rows: &[FeatureVector]) -> [f64; FEATURE_COUNT] {
    let mut means = [0.0; FEATURE_COUNT];
    for row in rows {
        for (m, x) in means.iter_mut().zip(row) {
            *m += x;
        }
    }
    let n = rows.len() as f64;
    means.iter_mut().for_each(|m| *m /= n);
    means
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(a: f64, b: f64) -> FeatureVector {
        [a, b, 0.0, 0.0, 0.0, 0.0]
    }

    #[test]
    fn recovers_exact_linear_relationship() {
        let rows: Vec<_> = (0..10)
            .map(|i| row(i as f64, ((i * 7) % 5) as f64))
            .collect();
        let targets: Vec<_> = rows.iter().map(|r| 3.0 * r[0] - 2.0 * r[1] + 4.0).collect();

        let model = fit_ols(&rows, &targets).unwrap();
        assert!((model.weights[0] - 3.0).abs() < 1e-9);
        assert!((model.weights[1] + 2.0).abs() < 1e-9);
        assert!((model.intercept - 4.0).abs() < 1e-9);
        // Constant columns carry no weight.
        assert!(model.weights[2..].iter().all(|w| w.abs() < 1e-9));
    }

    #[test]
    fn constant_target_gives_intercept_only() {
        let rows: Vec<_> = (0..12).map(|i| row((i as f64).sin(), (i as f64).cos())).collect();
        let targets = vec![10.0; 12];

        let model = fit_ols(&rows, &targets).unwrap();
        assert!(model.weights.iter().all(|w| w.abs() < 1e-12));
        assert!((model.intercept - 10.0).abs() < 1e-12);
    }

    #[test]
    fn single_sample_predicts_its_target() {
        let model = fit_ols(&[row(0.3, -0.7)], &[42.0]).unwrap();
        assert!((model.predict(&row(0.3, -0.7)) - 42.0).abs() < 1e-12);
    }

    #[test]
    fn underdetermined_fit_interpolates() {
        let rows = vec![row(1.0, 0.0), row(0.0, 1.0), row(-1.0, -1.0)];
        let targets = [5.0, 7.0, 0.0];
        let model = fit_ols(&rows, &targets).unwrap();
        for (r, t) in rows.iter().zip(targets) {
            assert!((model.predict(r) - t).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_non_finite_targets() {
        let err = fit_ols(&[row(0.0, 0.0)], &[f64::NAN]).unwrap_err();
        assert!(matches!(err, ModelError::Fit(_)));
    }

    #[test]
    fn rejects_empty_and_mismatched_input() {
        assert!(matches!(fit_ols(&[], &[]), Err(ModelError::EmptyTrainingSet)));
        assert!(matches!(
            fit_ols(&[row(0.0, 0.0)], &[1.0, 2.0]),
            Err(ModelError::LengthMismatch { .. })
        ));
    }
}
