use crate::error::FilterError;
use crate::state::{DateRange, FilterState, Warning};
use core_types::EnrichedTransaction;
use std::collections::HashSet;

/// Applies the product, customer and date selections conjunctively.
#[derive(Debug, Default)]
pub struct FilterEngine {}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the rows matching every non-empty constraint.
    ///
    /// An empty product or customer list and a missing date range each mean
    /// "no constraint" for that dimension.
    pub fn apply(
        &self,
        rows: &[EnrichedTransaction],
        products: &[String],
        customers: &[String],
        date_range: Option<DateRange>,
    ) -> Result<Vec<EnrichedTransaction>, FilterError> {
        if let Some(range) = date_range {
            if range.start > range.end {
                return Err(FilterError::InvertedDateRange {
                    start: range.start,
                    end: range.end,
                });
            }
        }

        let products: HashSet<&str> = products.iter().map(String::as_str).collect();
        let customers: HashSet<&str> = customers.iter().map(String::as_str).collect();

        Ok(rows
            .iter()
            .filter(|r| products.is_empty() || products.contains(r.product()))
            .filter(|r| date_range.is_none_or(|range| range.contains(r.date())))
            .filter(|r| {
                customers.is_empty() || r.customer().is_some_and(|c| customers.contains(c))
            })
            .cloned()
            .collect())
    }

    /// Like [`apply`](Self::apply), but falls back to the unfiltered rows and a
    /// warning instead of failing.
    pub fn apply_or_fallback(
        &self,
        rows: &[EnrichedTransaction],
        state: &FilterState,
    ) -> (Vec<EnrichedTransaction>, Option<Warning>) {
        match self.apply(rows, &state.products, &state.customers, state.date_range) {
            Ok(view) => (view, None),
            Err(e) => {
                tracing::warn!(error = %e, "Filter could not be applied; using the unfiltered table.");
                (
                    rows.to_vec(),
                    Some(Warning::FilterFallback {
                        reason: e.to_string(),
                    }),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Transaction;

    fn row(date: &str, product: &str, customer: Option<&str>) -> EnrichedTransaction {
        EnrichedTransaction {
            record: Transaction {
                date: date.parse().unwrap(),
                product: product.into(),
                customer: customer.map(Into::into),
                quantity: Some(1.0),
                fob_price: 400.0,
                cfr_price: 430.0,
                fx_rate: Some(5.0),
                corn_futures: None,
                soy_futures: None,
                oil_quote: None,
            },
            daily_mean_fx: Some(5.0),
            fob_value_local: Some(2000.0),
            cfr_value_local: Some(2150.0),
        }
    }

    fn table() -> Vec<EnrichedTransaction> {
        vec![
            row("2024-01-02", "Urea", Some("A")),
            row("2024-01-03", "NPK", Some("B")),
            row("2024-01-04", "Urea", Some("B")),
            row("2024-01-05", "MAP", None),
        ]
    }

    fn range(a: &str, b: &str) -> Option<DateRange> {
        Some(DateRange::new(a.parse().unwrap(), b.parse().unwrap()))
    }

    #[test]
    fn empty_selection_passes_everything() {
        let view = FilterEngine::new().apply(&table(), &[], &[], None).unwrap();
        assert_eq!(view, table());
    }

    #[test]
    fn constraints_combine_conjunctively() {
        let view = FilterEngine::new()
            .apply(
                &table(),
                &["Urea".to_string()],
                &["B".to_string()],
                range("2024-01-01", "2024-01-31"),
            )
            .unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].date(), "2024-01-04".parse().unwrap());
    }

    #[test]
    fn date_range_is_inclusive() {
        let view = FilterEngine::new()
            .apply(&table(), &[], &[], range("2024-01-03", "2024-01-04"))
            .unwrap();
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn customer_filter_excludes_rows_without_customer() {
        let customers = vec!["A".to_string(), "B".to_string()];
        let view = FilterEngine::new().apply(&table(), &[], &customers, None).unwrap();
        assert_eq!(view.len(), 3);
        assert!(view.iter().all(|r| r.product() != "MAP"));
    }

    #[test]
    fn inverted_range_falls_back_with_warning() {
        let state = FilterState {
            products: vec!["Urea".into()],
            date_range: range("2024-02-01", "2024-01-01"),
            ..FilterState::default()
        };
        let (view, warning) = FilterEngine::new().apply_or_fallback(&table(), &state);
        assert_eq!(view, table());
        assert!(matches!(warning, Some(Warning::FilterFallback { .. })));
    }
}
