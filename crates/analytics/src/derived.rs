use chrono::NaiveDate;
use core_types::{EnrichedTransaction, Transaction};
use std::collections::HashMap;

/// Mean FX rate per calendar date, over the rows of that date that carry one.
pub fn daily_mean_fx(transactions: &[Transaction]) -> HashMap<NaiveDate, f64> {
    let mut acc: HashMap<NaiveDate, (f64, usize)> = HashMap::new();
    for tx in transactions {
        if let Some(fx) = tx.fx_rate {
            let entry = acc.entry(tx.date).or_insert((0.0, 0));
            entry.0 += fx;
            entry.1 += 1;
        }
    }
    acc.into_iter()
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .collect()
}

/// Adds the per-row daily mean FX and the local-currency transaction values.
///
/// Depends only on the full table, so it runs once per load; filtering
/// afterwards never changes a row's daily mean.
pub fn derive_fields(transactions: &[Transaction]) -> Vec<EnrichedTransaction> {
    let fx_by_date = daily_mean_fx(transactions);

    transactions
        .iter()
        .map(|tx| {
            let daily_mean_fx = fx_by_date.get(&tx.date).copied();
            let value = |price: f64| match (tx.quantity, daily_mean_fx) {
                (Some(q), Some(fx)) => Some(q * price * fx),
                _ => None,
            };
            EnrichedTransaction {
                daily_mean_fx,
                fob_value_local: value(tx.fob_price),
                cfr_value_local: value(tx.cfr_price),
                record: tx.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(date: &str, quantity: Option<f64>, fob: f64, cfr: f64, fx: Option<f64>) -> Transaction {
        Transaction {
            date: date.parse().unwrap(),
            product: "Urea".into(),
            customer: None,
            quantity,
            fob_price: fob,
            cfr_price: cfr,
            fx_rate: fx,
            corn_futures: None,
            soy_futures: None,
            oil_quote: None,
        }
    }

    #[test]
    fn daily_mean_is_broadcast_to_every_row_of_the_date() {
        let rows = vec![
            tx("2024-01-02", Some(10.0), 400.0, 430.0, Some(5.0)),
            tx("2024-01-02", Some(20.0), 410.0, 445.0, Some(5.2)),
            tx("2024-01-02", Some(5.0), 405.0, 433.0, None),
            tx("2024-01-03", Some(8.0), 402.0, 431.0, Some(4.9)),
        ];
        let enriched = derive_fields(&rows);

        let jan2 = (5.0 + 5.2) / 2.0;
        for row in &enriched[..3] {
            assert_eq!(row.daily_mean_fx, Some(jan2));
        }
        assert_eq!(enriched[3].daily_mean_fx, Some(4.9));
        // The row without its own FX still gets the day's mean.
        assert_eq!(enriched[2].fob_value_local, Some(5.0 * 405.0 * jan2));
    }

    #[test]
    fn values_use_quantity_price_and_daily_fx() {
        let rows = vec![tx("2024-01-02", Some(12.5), 400.0, 430.0, Some(5.1))];
        let enriched = derive_fields(&rows);
        assert_eq!(enriched[0].fob_value_local, Some(12.5 * 400.0 * 5.1));
        assert_eq!(enriched[0].cfr_value_local, Some(12.5 * 430.0 * 5.1));
    }

    #[test]
    fn missing_inputs_leave_values_empty() {
        let rows = vec![
            tx("2024-01-02", None, 400.0, 430.0, Some(5.0)),
            tx("2024-01-03", Some(3.0), 400.0, 430.0, None),
        ];
        let enriched = derive_fields(&rows);
        assert_eq!(enriched[0].fob_value_local, None);
        assert_eq!(enriched[1].daily_mean_fx, None);
        assert_eq!(enriched[1].cfr_value_local, None);
    }
}
