use crate::charts::{BoxPlot, CommodityChart, PriceTrendChart, ScatterChart};
use crate::error::EngineError;
use crate::filter::FilterEngine;
use crate::simulator::{PricingSimulator, SimulationResult, SliderOptions};
use crate::state::{FilterState, RenderState, Warning};
use alerter::{Alert, TrailingWindowRule};
use analytics::{CorrelationMatrix, MetricsEngine, derive_fields};
use configuration::{Config, DataSources};
use core_types::{
    Capabilities, Column, DashboardVariant, DatasetSummary, EnrichedTransaction, SchemaProfile,
};
use dataset::{Dataset, DatasetCache};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Number of customers listed in the volume ranking.
const TOP_CUSTOMERS: usize = 5;

/// What a UI needs to populate its selectors before the first render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardOptions {
    pub profile: SchemaProfile,
    pub capabilities: Capabilities,
    pub summary: DatasetSummary,
    pub scatter_x: Vec<Column>,
    pub scatter_y: Vec<Column>,
    pub sliders: SliderOptions,
}

/// Derived rows of one loaded dataset, kept while the cache serves the same `Arc`.
struct Enriched {
    dataset: Arc<Dataset>,
    rows: Arc<Vec<EnrichedTransaction>>,
}

/// Load, derive, filter, compute. One call per user interaction.
pub struct Pipeline {
    // --- Inputs ---
    sources: DataSources,
    cache: DatasetCache,

    // --- Components ---
    filter: FilterEngine,
    metrics: MetricsEngine,
    simulator: PricingSimulator,
    alert_rule: TrailingWindowRule,

    // --- Memo ---
    enriched: Option<Enriched>,
}

impl Pipeline {
    /// Creates a pipeline reading the configured files from disk.
    pub fn new(config: &Config) -> Result<Self, EngineError> {
        Self::with_cache(config, DatasetCache::default())
    }

    /// Creates a pipeline over an explicit cache, e.g. one backed by an
    /// in-memory [`dataset::DatasetSource`].
    pub fn with_cache(config: &Config, cache: DatasetCache) -> Result<Self, EngineError> {
        Ok(Self {
            sources: config.data.clone(),
            cache,
            filter: FilterEngine::new(),
            metrics: MetricsEngine::new(),
            simulator: PricingSimulator::new(config.simulator.clone()),
            alert_rule: TrailingWindowRule::from_config(&config.alerting)?,
            enriched: None,
        })
    }

    /// Drops the cached dataset so the next render reads the files again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.enriched = None;
    }

    pub fn options(&mut self) -> Result<DashboardOptions, EngineError> {
        let dataset = self.cache.get_or_load(&self.sources)?;
        let caps = dataset.capabilities;
        Ok(DashboardOptions {
            profile: dataset.profile,
            capabilities: caps,
            summary: dataset.summary.clone(),
            scatter_x: caps
                .market_variables()
                .into_iter()
                .filter(|c| *c != Column::FobPrice)
                .collect(),
            scatter_y: ScatterChart::Y_OPTIONS.to_vec(),
            sliders: self.simulator.sliders(),
        })
    }

    /// Runs the simulator alone, without touching the dataset.
    pub fn simulate(&self, state: &FilterState) -> (SimulationResult, Vec<Warning>) {
        let inputs = state.simulator.unwrap_or_else(|| self.simulator.default_inputs());
        self.simulator.estimate(&inputs)
    }

    /// Produces the complete panel for one selection.
    ///
    /// # Errors
    ///
    /// Only a load failure is fatal. Filter, regression and alert problems
    /// are reported through [`RenderState::warnings`] instead.
    #[tracing::instrument(skip_all, fields(variant = ?state.variant))]
    pub fn render(&mut self, state: &FilterState) -> Result<RenderState, EngineError> {
        let dataset = self.cache.get_or_load(&self.sources)?;
        let rows = self.enriched_rows(&dataset);
        let summary = &dataset.summary;
        let caps = dataset.capabilities;
        let mut warnings = Vec::new();

        for product in &state.products {
            if !summary.products.contains(product) {
                warnings.push(Warning::UnknownProduct {
                    product: product.clone(),
                });
            }
        }

        let (mut view, fallback) = self.filter.apply_or_fallback(&rows, state);
        warnings.extend(fallback);

        let focus = self.focus_product(state, summary, &mut warnings);
        if state.variant == DashboardVariant::Product {
            if let Some(product) = &focus {
                view.retain(|r| r.product() == product);
            }
        }
        tracing::debug!(rows = rows.len(), view = view.len(), "Filter applied.");

        let kpis = self.metrics.kpis(&view);
        let price_trend = PriceTrendChart::build(&view, &mut warnings);
        let commodities = CommodityChart::build(&view, &caps);
        let price_distribution = BoxPlot::build(&view);

        let stat_columns: Vec<Column> = [Column::FobPrice, Column::CfrPrice, Column::Quantity]
            .into_iter()
            .filter(|c| caps.supports(*c))
            .collect();
        let product_stats = self.metrics.describe_by_product(&view, &stat_columns);

        let correlations = self.correlations(&view, &caps);
        let scatter = if view.is_empty() {
            None
        } else {
            ScatterChart::build(&view, &caps, state.scatter_x, state.scatter_y, &mut warnings)
        };

        let top_customers = if caps.customer && caps.quantity {
            self.metrics.top_customers(&view, TOP_CUSTOMERS)
        } else {
            Vec::new()
        };

        let product_metrics = match (&focus, state.variant) {
            (Some(product), DashboardVariant::Product) => {
                Some(self.metrics.product_metrics(&view, product))
            }
            (Some(product), DashboardVariant::Market) if state.focus_product.is_some() => {
                Some(self.metrics.product_metrics(&view, product))
            }
            _ => None,
        };

        let (simulation, clamped) = self.simulate(state);
        warnings.extend(clamped);

        let alert = self.evaluate_alert(&view, &mut warnings);

        for warning in &warnings {
            tracing::warn!(warning = %warning.message(), "Render warning.");
        }

        Ok(RenderState {
            variant: state.variant,
            profile: dataset.profile,
            capabilities: caps,
            summary: summary.clone(),
            view_rows: view.len(),
            kpis,
            price_trend,
            commodities,
            product_stats,
            price_distribution,
            correlations,
            scatter,
            top_customers,
            product_metrics,
            simulation,
            alert,
            warnings,
            records: state.include_records.then_some(view),
        })
    }

    fn enriched_rows(&mut self, dataset: &Arc<Dataset>) -> Arc<Vec<EnrichedTransaction>> {
        if let Some(memo) = &self.enriched {
            if Arc::ptr_eq(&memo.dataset, dataset) {
                return Arc::clone(&memo.rows);
            }
        }
        let rows = Arc::new(derive_fields(&dataset.transactions));
        self.enriched = Some(Enriched {
            dataset: Arc::clone(dataset),
            rows: Arc::clone(&rows),
        });
        rows
    }

    /// The requested focus product, or the first product in the dataset.
    fn focus_product(
        &self,
        state: &FilterState,
        summary: &DatasetSummary,
        warnings: &mut Vec<Warning>,
    ) -> Option<String> {
        match &state.focus_product {
            Some(product) if summary.products.contains(product) => Some(product.clone()),
            Some(product) => {
                warnings.push(Warning::UnknownProduct {
                    product: product.clone(),
                });
                summary.products.first().cloned()
            }
            None => summary.products.first().cloned(),
        }
    }

    fn correlations(&self, view: &[EnrichedTransaction], caps: &Capabilities) -> Option<CorrelationMatrix> {
        let columns = caps.market_variables();
        if view.is_empty() || columns.len() < 2 {
            return None;
        }
        Some(self.metrics.correlation_matrix(view, &columns))
    }

    /// Classifies the latest FOB price of the view; failures become warnings.
    fn evaluate_alert(&self, view: &[EnrichedTransaction], warnings: &mut Vec<Warning>) -> Option<Alert> {
        let series: Vec<_> = view.iter().map(|r| (r.date(), r.record.fob_price)).collect();
        match self.alert_rule.evaluate(&series) {
            Ok(alert) => alert,
            Err(e) => {
                warnings.push(Warning::AlertUnavailable {
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}
