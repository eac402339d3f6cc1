use crate::error::DatasetError;
use crate::reader::{RawTable, read_table};
use chrono::NaiveDate;
use core_types::{Column, SchemaProfile, Transaction};
use std::collections::BTreeMap;
use std::path::Path;

/// One daily market series read from a companion quote file.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteSeries {
    pub column: Column,
    pub values: BTreeMap<NaiveDate, f64>,
}

/// Reads a quote file with a `Data` column and one column per requested series.
///
/// Blank cells are skipped. When a date repeats, the later row wins.
pub fn read_quotes(path: &Path, columns: &[Column]) -> Result<Vec<QuoteSeries>, DatasetError> {
    let table = read_table(path, None)?;
    parse_quotes(&table, columns)
}

pub(crate) fn parse_quotes(
    table: &RawTable,
    columns: &[Column],
) -> Result<Vec<QuoteSeries>, DatasetError> {
    let header = |c: &Column| c.header(SchemaProfile::Commercial);

    let date_idx = table.position(header(&Column::Date));
    let value_idx: Vec<Option<usize>> = columns.iter().map(|c| table.position(header(c))).collect();

    let mut missing: Vec<String> = Vec::new();
    if date_idx.is_none() {
        missing.push(header(&Column::Date).to_string());
    }
    for (column, idx) in columns.iter().zip(&value_idx) {
        if idx.is_none() {
            missing.push(header(column).to_string());
        }
    }
    let (Some(date_idx), true) = (date_idx, missing.is_empty()) else {
        return Err(DatasetError::MissingColumns {
            path: table.path.clone(),
            columns: missing,
        });
    };

    let mut series: Vec<QuoteSeries> = columns
        .iter()
        .map(|c| QuoteSeries {
            column: *c,
            values: BTreeMap::new(),
        })
        .collect();
    let mut duplicates = 0usize;

    for row in 0..table.rows.len() {
        let invalid = |col: usize, reason: String| DatasetError::InvalidCell {
            path: table.path.clone(),
            row: row + 2,
            column: table.headers[col].clone(),
            value: table.cell(row, col).display(),
            reason,
        };

        let date = table
            .cell(row, date_idx)
            .to_date()
            .map_err(|reason| invalid(date_idx, reason))?;

        for (s, idx) in series.iter_mut().zip(&value_idx) {
            let Some(idx) = *idx else { continue };
            let value = table
                .cell(row, idx)
                .to_number()
                .map_err(|reason| invalid(idx, reason))?;
            if let Some(v) = value {
                if s.values.insert(date, v).is_some() {
                    duplicates += 1;
                }
            }
        }
    }

    if duplicates > 0 {
        tracing::warn!(
            path = %table.path.display(),
            duplicates,
            "Quote file repeats dates; later rows take precedence."
        );
    }

    Ok(series)
}

/// Fills `column` on every transaction whose own value is missing, joining on
/// the calendar date. Returns the number of cells filled.
pub fn apply_quotes(transactions: &mut [Transaction], series: &QuoteSeries) -> usize {
    let mut filled = 0;
    for tx in transactions.iter_mut() {
        let date = tx.date;
        let Some(slot) = quote_slot(tx, series.column) else {
            continue;
        };
        if slot.is_none() {
            if let Some(v) = series.values.get(&date) {
                *slot = Some(*v);
                filled += 1;
            }
        }
    }
    filled
}

fn quote_slot(tx: &mut Transaction, column: Column) -> Option<&mut Option<f64>> {
    match column {
        Column::OilQuote => Some(&mut tx.oil_quote),
        Column::SoyFutures => Some(&mut tx.soy_futures),
        Column::CornFutures => Some(&mut tx.corn_futures),
        _ => None,
    }
}
