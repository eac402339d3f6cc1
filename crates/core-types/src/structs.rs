use crate::schema::Column;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One sale event, as read from the primary dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub product: String,
    pub customer: Option<String>,
    /// Traded volume in tons.
    pub quantity: Option<f64>,
    /// FOB unit price, currency per ton.
    pub fob_price: f64,
    /// CFR unit price, currency per ton.
    pub cfr_price: f64,
    /// Local per foreign currency (R$/US$).
    pub fx_rate: Option<f64>,
    pub corn_futures: Option<f64>,
    pub soy_futures: Option<f64>,
    pub oil_quote: Option<f64>,
}

impl Transaction {
    /// Returns the numeric value held in `column`, if the column is numeric and
    /// the cell is present.
    pub fn value(&self, column: Column) -> Option<f64> {
        match column {
            Column::Quantity => self.quantity,
            Column::FobPrice => Some(self.fob_price),
            Column::CfrPrice => Some(self.cfr_price),
            Column::FxRate => self.fx_rate,
            Column::CornFutures => self.corn_futures,
            Column::SoyFutures => self.soy_futures,
            Column::OilQuote => self.oil_quote,
            Column::Date | Column::Product | Column::Customer => None,
        }
    }
}

/// A transaction augmented with the fields computed over the full table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    #[serde(flatten)]
    pub record: Transaction,
    /// Mean FX rate over every transaction sharing this row's date.
    pub daily_mean_fx: Option<f64>,
    /// quantity × FOB price × daily mean FX.
    pub fob_value_local: Option<f64>,
    /// quantity × CFR price × daily mean FX.
    pub cfr_value_local: Option<f64>,
}

impl EnrichedTransaction {
    pub fn date(&self) -> NaiveDate {
        self.record.date
    }

    pub fn product(&self) -> &str {
        &self.record.product
    }

    pub fn customer(&self) -> Option<&str> {
        self.record.customer.as_deref()
    }

    pub fn value(&self, column: Column) -> Option<f64> {
        self.record.value(column)
    }
}

/// What a loaded dataset contains, used to populate selector options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub products: Vec<String>,
    pub customers: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl DatasetSummary {
    pub fn from_transactions<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut products = BTreeSet::new();
        let mut customers = BTreeSet::new();
        let mut summary = Self::default();

        for record in records {
            summary.rows += 1;
            products.insert(record.product.clone());
            if let Some(customer) = &record.customer {
                customers.insert(customer.clone());
            }
            summary.first_date = Some(match summary.first_date {
                Some(d) => d.min(record.date),
                None => record.date,
            });
            summary.last_date = Some(match summary.last_date {
                Some(d) => d.max(record.date),
                None => record.date,
            });
        }

        summary.products = products.into_iter().collect();
        summary.customers = customers.into_iter().collect();
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, product: &str, customer: Option<&str>) -> Transaction {
        Transaction {
            date: date.parse().unwrap(),
            product: product.to_string(),
            customer: customer.map(str::to_string),
            quantity: Some(10.0),
            fob_price: 400.0,
            cfr_price: 430.0,
            fx_rate: None,
            corn_futures: None,
            soy_futures: None,
            oil_quote: Some(82.0),
        }
    }

    #[test]
    fn value_maps_columns_to_fields() {
        let r = record("2024-01-02", "Urea", None);
        assert_eq!(r.value(Column::FobPrice), Some(400.0));
        assert_eq!(r.value(Column::OilQuote), Some(82.0));
        assert_eq!(r.value(Column::FxRate), None);
        assert_eq!(r.value(Column::Product), None);
    }

    #[test]
    fn summary_collects_distinct_sorted_options() {
        let rows = vec![
            record("2024-01-05", "NPK", Some("Beta")),
            record("2024-01-02", "Urea", Some("Alpha")),
            record("2024-01-09", "Urea", None),
        ];
        let summary = DatasetSummary::from_transactions(&rows);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.products, vec!["NPK", "Urea"]);
        assert_eq!(summary.customers, vec!["Alpha", "Beta"]);
        assert_eq!(summary.first_date, Some("2024-01-02".parse().unwrap()));
        assert_eq!(summary.last_date, Some("2024-01-09".parse().unwrap()));
    }
}
