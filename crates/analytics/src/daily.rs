use crate::error::AnalyticsError;
use crate::regression::{LinearFit, ols};
use chrono::NaiveDate;
use core_types::{Column, EnrichedTransaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One value per calendar date, sorted ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub column: Column,
    pub points: Vec<(NaiveDate, f64)>,
}

impl DailySeries {
    /// Averages `column` per date over the rows that carry a value.
    pub fn mean_by_date(rows: &[EnrichedTransaction], column: Column) -> Self {
        let mut acc: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for row in rows {
            if let Some(v) = row.value(column) {
                let entry = acc.entry(row.date()).or_insert((0.0, 0));
                entry.0 += v;
                entry.1 += 1;
            }
        }
        Self {
            column,
            points: acc
                .into_iter()
                .map(|(date, (sum, count))| (date, sum / count as f64))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Least-squares line of value against time (seconds since the epoch).
    pub fn linear_trend(&self) -> Result<LinearFit, AnalyticsError> {
        let xs: Vec<f64> = self.points.iter().map(|(d, _)| epoch_seconds(*d)).collect();
        let ys: Vec<f64> = self.points.iter().map(|(_, v)| *v).collect();
        ols(&xs, &ys, "linear trend")
    }

    /// The trend line evaluated at each date of the series.
    pub fn trend_line(&self) -> Result<Vec<(NaiveDate, f64)>, AnalyticsError> {
        let fit = self.linear_trend()?;
        Ok(self
            .points
            .iter()
            .map(|(d, _)| (*d, fit.predict(epoch_seconds(*d))))
            .collect())
    }
}

fn epoch_seconds(date: NaiveDate) -> f64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp() as f64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use core_types::Transaction;

    fn row(date: &str, fob: f64) -> EnrichedTransaction {
        EnrichedTransaction {
            record: Transaction {
                date: date.parse().unwrap(),
                product: "Urea".into(),
                customer: None,
                quantity: None,
                fob_price: fob,
                cfr_price: fob + 30.0,
                fx_rate: None,
                corn_futures: None,
                soy_futures: None,
                oil_quote: None,
            },
            daily_mean_fx: None,
            fob_value_local: None,
            cfr_value_local: None,
        }
    }

    #[test]
    fn averages_per_date_in_order() {
        let rows = vec![row("2024-01-03", 410.0), row("2024-01-02", 400.0), row("2024-01-02", 420.0)];
        let series = DailySeries::mean_by_date(&rows, Column::FobPrice);
        assert_eq!(
            series.points,
            vec![("2024-01-02".parse().unwrap(), 410.0), ("2024-01-03".parse().unwrap(), 410.0)]
        );
        assert!(DailySeries::mean_by_date(&rows, Column::OilQuote).is_empty());
    }

    #[test]
    fn trend_follows_a_linear_daily_increase() {
        let rows: Vec<_> = (1..=9)
            .map(|d| row(&format!("2024-01-0{d}"), 400.0 + 2.0 * d as f64))
            .collect();
        let series = DailySeries::mean_by_date(&rows, Column::FobPrice);
        let fit = series.linear_trend().unwrap();
        assert_relative_eq!(fit.slope * 86_400.0, 2.0, epsilon = 1e-9);
        let line = series.trend_line().unwrap();
        assert_relative_eq!(line[4].1, 410.0, epsilon = 1e-6);
    }

    #[test]
    fn single_date_has_no_trend() {
        let series = DailySeries::mean_by_date(&[row("2024-01-02", 1.0)], Column::FobPrice);
        assert!(matches!(
            series.trend_line(),
            Err(AnalyticsError::InsufficientData { found: 1, .. })
        ));
    }
}
