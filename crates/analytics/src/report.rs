use crate::error::AnalyticsError;
use crate::regression::LinearFit;
use crate::stats::Summary;
use core_types::Column;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Headline indicators of the current view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Kpis {
    pub transactions: usize,
    pub mean_fob_price: Option<f64>,
    /// Total traded volume in tons; `None` when no row carries a quantity.
    pub total_volume: Option<f64>,
    /// `mean(CFR − FOB) / mean(FOB) × 100`.
    pub cfr_margin_pct: Option<f64>,
    pub mean_fx_rate: Option<f64>,
    /// Sum of quantity × FOB × daily mean FX, in local currency.
    pub total_fob_value_local: Option<f64>,
    pub total_cfr_value_local: Option<f64>,
}

/// Outcome of one regression as handed to a presentation layer.
///
/// Undefined fits carry the reason instead of NaN coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Estimate {
    Fitted(LinearFit),
    InsufficientData { needed: usize, found: usize },
    Unavailable { reason: String },
}

impl Estimate {
    /// The fitted slope, when the fit succeeded.
    pub fn coefficient(&self) -> Option<f64> {
        match self {
            Estimate::Fitted(fit) => Some(fit.slope),
            _ => None,
        }
    }
}

impl From<Result<LinearFit, AnalyticsError>> for Estimate {
    fn from(result: Result<LinearFit, AnalyticsError>) -> Self {
        match result {
            Ok(fit) => Estimate::Fitted(fit),
            Err(AnalyticsError::InsufficientData { needed, found, .. }) => {
                Estimate::InsufficientData { needed, found }
            }
            Err(e) => Estimate::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

/// Per-product snapshot: elasticity, FX pass-through and mean price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub product: String,
    pub observations: usize,
    /// Slope of ln(quantity) on ln(FOB price).
    pub elasticity: Estimate,
    /// Slope of FOB price on the FX rate.
    pub pass_through: Estimate,
    pub mean_fob_price: Option<f64>,
}

/// Descriptive statistics of the price and volume columns for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub product: String,
    pub columns: BTreeMap<Column, Summary>,
}

/// Pairwise Pearson correlations; `values[i][j]` pairs `columns[i]` and `columns[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Column, b: Column) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerVolume {
    pub customer: String,
    pub volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_from_error_keeps_the_reason() {
        let insufficient: Estimate = Err(AnalyticsError::InsufficientData {
            what: "elasticity",
            needed: 2,
            found: 0,
        })
        .into();
        assert_eq!(insufficient, Estimate::InsufficientData { needed: 2, found: 0 });
        assert_eq!(insufficient.coefficient(), None);

        let constant: Estimate = Err(AnalyticsError::ConstantRegressor("pass-through")).into();
        assert!(matches!(constant, Estimate::Unavailable { reason } if reason.contains("constant")));
    }
}
