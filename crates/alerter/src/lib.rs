//! # Alerter
//!
//! A control-chart style rule over the most recent prices: the latest
//! observation is compared against the mean ± k·σ band of the observations
//! that precede it. State-free; evaluated once per render.

use chrono::NaiveDate;
use configuration::AlertingConfig;
use core_types::AlertLevel;
use serde::{Deserialize, Serialize};

pub mod error;

pub use error::AlertError;

/// The classification of the latest observation, with the band it was tested against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub date: NaiveDate,
    pub current: f64,
    pub mean: f64,
    pub std: f64,
    pub lower: f64,
    pub upper: f64,
    pub window: usize,
}

impl Alert {
    /// A one-line description suitable for a status banner.
    pub fn message(&self) -> String {
        match self.level {
            AlertLevel::High => format!(
                "ALERT: current FOB price {:.2} is above the {}-observation mean + {:.2} ({:.2})",
                self.current, self.window, self.upper - self.mean, self.upper
            ),
            AlertLevel::Low => format!(
                "Attention: current FOB price {:.2} is below the {}-observation mean - {:.2} ({:.2})",
                self.current, self.window, self.mean - self.lower, self.lower
            ),
            AlertLevel::Normal => format!(
                "FOB price {:.2} is within the normal range [{:.2}, {:.2}]",
                self.current, self.lower, self.upper
            ),
        }
    }
}

/// Classifies the latest value of a series against a trailing window.
#[derive(Debug, Clone, PartialEq)]
pub struct TrailingWindowRule {
    window: usize,
    sigma: f64,
}

impl Default for TrailingWindowRule {
    fn default() -> Self {
        Self {
            window: 30,
            sigma: 2.0,
        }
    }
}

impl TrailingWindowRule {
    pub fn new(window: usize, sigma: f64) -> Result<Self, AlertError> {
        if window < 2 {
            return Err(AlertError::InvalidRule(format!(
                "window must hold at least 2 observations, got {window}"
            )));
        }
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(AlertError::InvalidRule(format!(
                "band width must be positive, got {sigma}"
            )));
        }
        Ok(Self { window, sigma })
    }

    pub fn from_config(config: &AlertingConfig) -> Result<Self, AlertError> {
        Self::new(config.window, config.sigma)
    }

    /// Observations needed before an alert can be evaluated.
    pub fn required_observations(&self) -> usize {
        self.window + 1
    }

    /// Evaluates the rule over `series`, which need not be sorted.
    ///
    /// The series is ordered by date (ties keep their input order); the last
    /// observation is "current" and the trailing `window` observations, the
    /// current one included, form the baseline. Returns `Ok(None)` when there
    /// are not enough observations, which is not an error.
    pub fn evaluate(&self, series: &[(NaiveDate, f64)]) -> Result<Option<Alert>, AlertError> {
        if series.len() < self.required_observations() {
            tracing::debug!(
                observations = series.len(),
                required = self.required_observations(),
                "Not enough observations for a price alert."
            );
            return Ok(None);
        }
        if let Some((date, _)) = series.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AlertError::NonFiniteObservation { date: *date });
        }

        let mut ordered = series.to_vec();
        ordered.sort_by_key(|(date, _)| *date);

        let Some((date, current)) = ordered.last().copied() else {
            return Ok(None);
        };
        let baseline: Vec<f64> = ordered[ordered.len() - self.window..]
            .iter()
            .map(|(_, v)| *v)
            .collect();

        let n = baseline.len() as f64;
        let mean = baseline.iter().sum::<f64>() / n;
        let variance = baseline.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
        let std = variance.sqrt();

        let upper = mean + self.sigma * std;
        let lower = mean - self.sigma * std;
        let level = if current > upper {
            AlertLevel::High
        } else if current < lower {
            AlertLevel::Low
        } else {
            AlertLevel::Normal
        };

        tracing::info!(%level, current, mean, std, "Price alert evaluated.");

        Ok(Some(Alert {
            level,
            date,
            current,
            mean,
            std,
            lower,
            upper,
            window: self.window,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn series(values: &[f64]) -> Vec<(NaiveDate, f64)> {
        let start: NaiveDate = "2024-01-01".parse().unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (start + Duration::days(i as i64), *v))
            .collect()
    }

    fn baseline() -> Vec<f64> {
        (0..30).map(|i| 400.0 + ((i * 7) % 11) as f64).collect()
    }

    fn mean_std(values: &[f64]) -> (f64, f64) {
        let n = values.len() as f64;
        let m = values.iter().sum::<f64>() / n;
        let v = values.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / (n - 1.0);
        (m, v.sqrt())
    }

    #[test]
    fn three_sigma_spike_is_high() {
        let mut values = baseline();
        let (m, s) = mean_std(&values);
        values.push(m + 3.0 * s);
        let alert = TrailingWindowRule::default().evaluate(&series(&values)).unwrap().unwrap();
        assert_eq!(alert.level, AlertLevel::High);

        // The window is the last 30 observations, the spike included.
        let (wm, ws) = mean_std(&values[values.len() - 30..]);
        assert_relative_eq!(alert.mean, wm, epsilon = 1e-9);
        assert_relative_eq!(alert.std, ws, epsilon = 1e-9);
        assert_relative_eq!(alert.upper, wm + 2.0 * ws, epsilon = 1e-9);
    }

    #[test]
    fn current_value_widens_its_own_band() {
        // Above the band of the 30 prior prices, but the window that contains
        // it has a band wide enough to hold it.
        let mut values = baseline();
        let (m, s) = mean_std(&values);
        let current = m + 2.1 * s;
        assert!(current > m + 2.0 * s);
        values.push(current);

        let alert = TrailingWindowRule::default().evaluate(&series(&values)).unwrap().unwrap();
        assert_eq!(alert.level, AlertLevel::Normal);
        assert!(alert.upper > current);
        assert_relative_eq!(alert.current, current);
    }

    #[test]
    fn three_sigma_drop_is_low() {
        let mut values = baseline();
        let (m, s) = mean_std(&values);
        values.push(m - 3.0 * s);
        let alert = TrailingWindowRule::default().evaluate(&series(&values)).unwrap().unwrap();
        assert_eq!(alert.level, AlertLevel::Low);
    }

    #[test]
    fn flat_series_is_normal() {
        let values = vec![450.0; 31];
        let alert = TrailingWindowRule::default().evaluate(&series(&values)).unwrap().unwrap();
        assert_eq!(alert.level, AlertLevel::Normal);
        assert_eq!(alert.std, 0.0);
    }

    #[test]
    fn short_series_emits_no_alert() {
        let values = vec![450.0; 30];
        assert_eq!(TrailingWindowRule::default().evaluate(&series(&values)), Ok(None));
    }

    #[test]
    fn only_the_trailing_window_counts() {
        // Old, wildly different prices fall outside the window.
        let mut values = vec![10_000.0; 20];
        values.extend(vec![450.0; 30]);
        values.push(450.0);
        let alert = TrailingWindowRule::default().evaluate(&series(&values)).unwrap().unwrap();
        assert_eq!(alert.level, AlertLevel::Normal);
        assert_eq!(alert.mean, 450.0);
    }

    #[test]
    fn input_order_does_not_matter() {
        let mut values = baseline();
        let (m, s) = mean_std(&values);
        values.push(m + 3.0 * s);
        let mut shuffled = series(&values);
        shuffled.reverse();
        let alert = TrailingWindowRule::default().evaluate(&shuffled).unwrap().unwrap();
        assert_eq!(alert.level, AlertLevel::High);
        assert_eq!(alert.date, shuffled[0].0);
    }

    #[test]
    fn non_finite_values_are_errors() {
        let mut values = vec![450.0; 31];
        values[5] = f64::NAN;
        assert!(matches!(
            TrailingWindowRule::default().evaluate(&series(&values)),
            Err(AlertError::NonFiniteObservation { .. })
        ));
    }

    #[test]
    fn rule_parameters_are_validated() {
        assert!(TrailingWindowRule::new(1, 2.0).is_err());
        assert!(TrailingWindowRule::new(30, 0.0).is_err());
        let rule = TrailingWindowRule::from_config(&AlertingConfig::default()).unwrap();
        assert_eq!(rule, TrailingWindowRule::default());
        assert_eq!(rule.required_observations(), 31);
    }
}
