use crate::error::AnalyticsError;
use crate::regression::{LinearFit, ols};
use crate::report::{CorrelationMatrix, CustomerVolume, Kpis, MetricResult, ProductStats};
use crate::stats::{self, Summary};
use core_types::{Column, EnrichedTransaction};
use std::collections::{BTreeMap, HashMap};

/// A stateless calculator for the metrics shown on the pricing panel.
#[derive(Debug, Default)]
pub struct MetricsEngine {}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price elasticity of volume: OLS of ln(quantity) on ln(FOB price).
    ///
    /// Only rows with strictly positive quantity and price take part, since the
    /// logarithm is undefined otherwise.
    pub fn elasticity(&self, rows: &[EnrichedTransaction]) -> Result<LinearFit, AnalyticsError> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = rows
            .iter()
            .filter_map(|r| {
                let q = r.record.quantity?;
                let p = r.record.fob_price;
                (q > 0.0 && p > 0.0).then(|| (p.ln(), q.ln()))
            })
            .unzip();
        ols(&xs, &ys, "price elasticity")
    }

    /// FX pass-through: OLS of FOB price on the FX rate.
    pub fn pass_through(&self, rows: &[EnrichedTransaction]) -> Result<LinearFit, AnalyticsError> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = rows
            .iter()
            .filter_map(|r| {
                let fx = r.record.fx_rate?;
                let p = r.record.fob_price;
                (fx.is_finite() && p.is_finite()).then_some((fx, p))
            })
            .unzip();
        ols(&xs, &ys, "FX pass-through")
    }

    /// The Metric Result for one product of `rows`.
    pub fn product_metrics(&self, rows: &[EnrichedTransaction], product: &str) -> MetricResult {
        let subset: Vec<EnrichedTransaction> = rows
            .iter()
            .filter(|r| r.product() == product)
            .cloned()
            .collect();

        let elasticity = self.elasticity(&subset);
        let pass_through = self.pass_through(&subset);
        for (name, outcome) in [("elasticity", &elasticity), ("pass-through", &pass_through)] {
            if let Err(e) = outcome {
                tracing::warn!(product, metric = name, error = %e, "Regression unavailable.");
            }
        }

        let prices: Vec<f64> = subset.iter().map(|r| r.record.fob_price).collect();
        MetricResult {
            product: product.to_string(),
            observations: subset.len(),
            elasticity: elasticity.into(),
            pass_through: pass_through.into(),
            mean_fob_price: stats::mean(&prices),
        }
    }

    pub fn kpis(&self, rows: &[EnrichedTransaction]) -> Kpis {
        let fob: Vec<f64> = rows.iter().map(|r| r.record.fob_price).collect();
        let spread: Vec<f64> = rows
            .iter()
            .map(|r| r.record.cfr_price - r.record.fob_price)
            .collect();
        let fx: Vec<f64> = rows.iter().filter_map(|r| r.record.fx_rate).collect();

        let mean_fob_price = stats::mean(&fob);
        let cfr_margin_pct = match (stats::mean(&spread), mean_fob_price) {
            (Some(s), Some(p)) if p != 0.0 => Some(s / p * 100.0),
            _ => None,
        };

        Kpis {
            transactions: rows.len(),
            mean_fob_price,
            total_volume: sum_present(rows.iter().map(|r| r.record.quantity)),
            cfr_margin_pct,
            mean_fx_rate: stats::mean(&fx),
            total_fob_value_local: sum_present(rows.iter().map(|r| r.fob_value_local)),
            total_cfr_value_local: sum_present(rows.iter().map(|r| r.cfr_value_local)),
        }
    }

    /// Mean, std, min and max of each of `columns`, grouped by product.
    pub fn describe_by_product(
        &self,
        rows: &[EnrichedTransaction],
        columns: &[Column],
    ) -> Vec<ProductStats> {
        let mut groups: BTreeMap<&str, Vec<&EnrichedTransaction>> = BTreeMap::new();
        for row in rows {
            groups.entry(row.product()).or_default().push(row);
        }

        groups
            .into_iter()
            .map(|(product, members)| {
                let columns = columns
                    .iter()
                    .map(|c| {
                        let values: Vec<f64> = members.iter().filter_map(|r| r.value(*c)).collect();
                        (*c, Summary::of(&values))
                    })
                    .collect();
                ProductStats {
                    product: product.to_string(),
                    columns,
                }
            })
            .collect()
    }

    /// Pearson correlations among `columns`, each pair over the rows where
    /// both values are present.
    pub fn correlation_matrix(
        &self,
        rows: &[EnrichedTransaction],
        columns: &[Column],
    ) -> CorrelationMatrix {
        let values = columns
            .iter()
            .map(|a| {
                columns
                    .iter()
                    .map(|b| {
                        let (xs, ys): (Vec<f64>, Vec<f64>) = rows
                            .iter()
                            .filter_map(|r| Some((r.value(*a)?, r.value(*b)?)))
                            .unzip();
                        stats::pearson(&xs, &ys)
                    })
                    .collect()
            })
            .collect();

        CorrelationMatrix {
            columns: columns.to_vec(),
            values,
        }
    }

    /// The `n` customers with the largest traded volume, largest first.
    pub fn top_customers(&self, rows: &[EnrichedTransaction], n: usize) -> Vec<CustomerVolume> {
        let mut totals: HashMap<&str, f64> = HashMap::new();
        for row in rows {
            if let (Some(customer), Some(q)) = (row.customer(), row.record.quantity) {
                *totals.entry(customer).or_insert(0.0) += q;
            }
        }

        let mut ranked: Vec<CustomerVolume> = totals
            .into_iter()
            .map(|(customer, volume)| CustomerVolume {
                customer: customer.to_string(),
                volume,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.volume
                .total_cmp(&a.volume)
                .then_with(|| a.customer.cmp(&b.customer))
        });
        ranked.truncate(n);
        ranked
    }
}

fn sum_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}
