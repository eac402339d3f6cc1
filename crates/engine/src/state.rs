use crate::charts::{BoxPlot, CommodityChart, PriceTrendChart, ScatterChart};
use crate::simulator::{SimulationResult, SimulatorInputs};
use alerter::Alert;
use analytics::{CorrelationMatrix, CustomerVolume, Kpis, MetricResult, ProductStats};
use chrono::NaiveDate;
use core_types::{
    Capabilities, Column, DashboardVariant, DatasetSummary, EnrichedTransaction, SchemaProfile,
};
use serde::{Deserialize, Serialize};

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Everything a user can select on the panel.
///
/// Empty selections mean "no constraint", matching the select-all default
/// of the selector widgets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub variant: DashboardVariant,
    pub products: Vec<String>,
    pub customers: Vec<String>,
    pub date_range: Option<DateRange>,
    pub scatter_x: Option<Column>,
    pub scatter_y: Option<Column>,
    /// Product whose elasticity and pass-through are reported.
    pub focus_product: Option<String>,
    pub simulator: Option<SimulatorInputs>,
    /// Include the filtered rows themselves in the render state.
    pub include_records: bool,
}

/// A recoverable problem met while rendering; the panel still renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The selection could not be applied; the unfiltered table is shown.
    FilterFallback { reason: String },
    /// The price alert could not be evaluated.
    AlertUnavailable { reason: String },
    TrendUnavailable { reason: String },
    ScatterAxisUnavailable { requested: Column, used: Column },
    SimulatorInputClamped {
        input: String,
        requested: String,
        used: String,
    },
    UnknownProduct { product: String },
}

impl Warning {
    pub fn message(&self) -> String {
        match self {
            Warning::FilterFallback { reason } => {
                format!("Could not apply filters ({reason}); showing all data")
            }
            Warning::AlertUnavailable { reason } => format!("Could not check alerts: {reason}"),
            Warning::TrendUnavailable { reason } => format!("No trend line: {reason}"),
            Warning::ScatterAxisUnavailable { requested, used } => format!(
                "'{}' is not available in this dataset; using '{}'",
                requested.label(),
                used.label()
            ),
            Warning::SimulatorInputClamped {
                input,
                requested,
                used,
            } => format!("Simulator {input} {requested} is not a slider position; using {used}"),
            Warning::UnknownProduct { product } => {
                format!("Product '{product}' is not present in the dataset")
            }
        }
    }
}

/// The complete output of one pipeline run, ready for any presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub variant: DashboardVariant,
    pub profile: SchemaProfile,
    pub capabilities: Capabilities,
    /// Options for the selectors, taken from the full dataset.
    pub summary: DatasetSummary,
    pub view_rows: usize,
    pub kpis: Kpis,
    pub price_trend: Option<PriceTrendChart>,
    pub commodities: Option<CommodityChart>,
    pub product_stats: Vec<ProductStats>,
    pub price_distribution: Option<BoxPlot>,
    pub correlations: Option<CorrelationMatrix>,
    pub scatter: Option<ScatterChart>,
    pub top_customers: Vec<CustomerVolume>,
    pub product_metrics: Option<MetricResult>,
    pub simulation: SimulationResult,
    pub alert: Option<Alert>,
    pub warnings: Vec<Warning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<EnrichedTransaction>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_state_deserializes_from_partial_json() {
        let state: FilterState = serde_json::from_str(
            r#"{"products":["Urea"],"date_range":{"start":"2024-01-01","end":"2024-01-31"},"scatter_x":"oil_quote"}"#,
        )
        .unwrap();
        assert_eq!(state.products, vec!["Urea"]);
        assert_eq!(state.variant, DashboardVariant::Market);
        assert_eq!(state.scatter_x, Some(Column::OilQuote));
        assert!(state.customers.is_empty());
        assert!(state.date_range.unwrap().contains("2024-01-31".parse().unwrap()));
    }

    #[test]
    fn warnings_are_tagged() {
        let w = Warning::FilterFallback {
            reason: "bad range".into(),
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "filter_fallback");
        assert!(w.message().contains("showing all data"));
    }
}
