use crate::error::AnalyticsError;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Result of an ordinary-least-squares fit `y = intercept + slope·x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
    /// Coefficient of determination; 1.0 when `y` is constant and fitted exactly.
    pub r_squared: f64,
    pub observations: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fits `y = a + b·x` by least squares.
///
/// The regressor is centred before solving so that large-magnitude inputs
/// (epoch seconds on a time axis) stay well conditioned; the returned
/// intercept is expressed in the original units.
///
/// # Errors
///
/// * `InsufficientData` when fewer than two paired observations are given.
/// * `ConstantRegressor` when every `x` is equal, leaving the slope undefined.
pub fn ols(xs: &[f64], ys: &[f64], what: &'static str) -> Result<LinearFit, AnalyticsError> {
    if xs.len() != ys.len() {
        return Err(AnalyticsError::Calculation(format!(
            "{what}: {} regressor values but {} responses",
            xs.len(),
            ys.len()
        )));
    }
    let n = xs.len();
    if n < 2 {
        return Err(AnalyticsError::InsufficientData {
            what,
            needed: 2,
            found: n,
        });
    }
    if xs.iter().chain(ys).any(|v| !v.is_finite()) {
        return Err(AnalyticsError::Calculation(format!(
            "{what}: non-finite input value"
        )));
    }

    let x_mean = xs.iter().sum::<f64>() / n as f64;
    let spread = xs.iter().map(|x| (x - x_mean).abs()).fold(0.0, f64::max);
    if spread <= f64::EPSILON * x_mean.abs().max(1.0) {
        return Err(AnalyticsError::ConstantRegressor(what));
    }

    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { 1.0 } else { xs[i] - x_mean });
    let response = DVector::from_column_slice(ys);

    let svd = design.svd(true, true);
    if svd.rank(1e-12 * spread.max(1.0)) < 2 {
        return Err(AnalyticsError::ConstantRegressor(what));
    }
    let beta = svd
        .solve(&response, 1e-12)
        .map_err(|e| AnalyticsError::Calculation(format!("{what}: {e}")))?;

    let slope = beta[1];
    let intercept = beta[0] - slope * x_mean;

    let y_mean = ys.iter().sum::<f64>() / n as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let fitted = beta[0] + slope * (x - x_mean);
        ss_res += (y - fitted) * (y - fitted);
        ss_tot += (y - y_mean) * (y - y_mean);
    }
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    Ok(LinearFit {
        intercept,
        slope,
        r_squared,
        observations: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_exact_linear_relationship() {
        let xs: Vec<f64> = (0..20).map(|i| 4.0 + i as f64 * 0.15).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 120.0 + 35.5 * x).collect();
        let fit = ols(&xs, &ys, "test").unwrap();
        assert_relative_eq!(fit.intercept, 120.0, epsilon = 1e-8);
        assert_relative_eq!(fit.slope, 35.5, epsilon = 1e-9);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
        assert_eq!(fit.observations, 20);
    }

    #[test]
    fn large_regressor_values_stay_accurate() {
        // Epoch seconds for consecutive days.
        let xs: Vec<f64> = (0..30).map(|d| 1_704_153_600.0 + d as f64 * 86_400.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| -50.0 + 3e-7 * x).collect();
        let fit = ols(&xs, &ys, "trend").unwrap();
        assert_relative_eq!(fit.slope, 3e-7, max_relative = 1e-8);
        assert_relative_eq!(fit.predict(xs[10]), ys[10], epsilon = 1e-6);
    }

    #[test]
    fn fewer_than_two_points_is_insufficient() {
        assert_eq!(
            ols(&[1.0], &[2.0], "elasticity"),
            Err(AnalyticsError::InsufficientData {
                what: "elasticity",
                needed: 2,
                found: 1
            })
        );
        assert!(matches!(
            ols(&[], &[], "x"),
            Err(AnalyticsError::InsufficientData { found: 0, .. })
        ));
    }

    #[test]
    fn constant_regressor_is_rejected() {
        assert_eq!(
            ols(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0], "pass-through"),
            Err(AnalyticsError::ConstantRegressor("pass-through"))
        );
    }

    #[test]
    fn noisy_fit_reports_partial_r_squared() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [1.0, 3.0, 2.0, 4.0];
        let fit = ols(&xs, &ys, "noisy").unwrap();
        assert_relative_eq!(fit.slope, 0.8, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 0.5, epsilon = 1e-12);
        assert!(fit.r_squared > 0.0 && fit.r_squared < 1.0);
    }
}
