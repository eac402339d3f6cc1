use crate::error::DatasetError;
use crate::quotes::{apply_quotes, read_quotes};
use crate::reader::{RawTable, read_table};
use crate::schema::ResolvedSchema;
use configuration::DataSources;
use core_types::{Capabilities, Column, DatasetSummary, SchemaProfile, Transaction};

/// A fully loaded, validated transaction table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub profile: SchemaProfile,
    pub capabilities: Capabilities,
    pub transactions: Vec<Transaction>,
    pub summary: DatasetSummary,
}

impl Dataset {
    /// Builds a dataset from already-typed records, deriving the summary.
    pub fn new(
        profile: SchemaProfile,
        capabilities: Capabilities,
        transactions: Vec<Transaction>,
    ) -> Self {
        let summary = DatasetSummary::from_transactions(&transactions);
        Self {
            profile,
            capabilities,
            transactions,
            summary,
        }
    }
}

/// Anything that can produce a [`Dataset`] for a set of sources.
///
/// The cache and the pipeline depend on this seam rather than on the file
/// readers, so tests can feed in-memory tables.
pub trait DatasetSource: Send + Sync {
    fn load(&self, sources: &DataSources) -> Result<Dataset, DatasetError>;
}

/// Reads the primary dataset and joins the optional quote files onto it.
#[derive(Debug, Default, Clone)]
pub struct DatasetLoader;

impl DatasetLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DatasetSource for DatasetLoader {
    fn load(&self, sources: &DataSources) -> Result<Dataset, DatasetError> {
        tracing::info!(path = %sources.primary.display(), "Loading primary dataset.");

        let table = read_table(&sources.primary, sources.sheet.as_deref())?;
        let schema = ResolvedSchema::resolve(&table)?;
        let mut transactions = parse_transactions(&table, &schema)?;
        let mut capabilities = schema.capabilities;

        if let Some(path) = &sources.oil_quotes {
            for series in read_quotes(path, &[Column::OilQuote])? {
                let filled = apply_quotes(&mut transactions, &series);
                tracing::debug!(path = %path.display(), filled, "Joined oil quotes.");
                capabilities.enable(series.column);
            }
        }

        if let Some(path) = &sources.futures {
            for series in read_quotes(path, &[Column::SoyFutures, Column::CornFutures])? {
                let filled = apply_quotes(&mut transactions, &series);
                tracing::debug!(path = %path.display(), column = ?series.column, filled, "Joined futures closes.");
                capabilities.enable(series.column);
            }
        }

        let dataset = Dataset::new(schema.profile, capabilities, transactions);
        tracing::info!(
            rows = dataset.summary.rows,
            products = dataset.summary.products.len(),
            customers = dataset.summary.customers.len(),
            profile = ?dataset.profile,
            "Dataset loaded."
        );
        Ok(dataset)
    }
}

/// Converts every row of `table` to a [`Transaction`].
///
/// Any malformed required cell aborts the whole load; a blank optional cell
/// becomes `None`, a malformed one is still an error.
pub fn parse_transactions(
    table: &RawTable,
    schema: &ResolvedSchema,
) -> Result<Vec<Transaction>, DatasetError> {
    if table.rows.is_empty() {
        return Err(DatasetError::Empty(table.path.clone()));
    }

    let mut out = Vec::with_capacity(table.rows.len());

    for row in 0..table.rows.len() {
        let invalid = |col: usize, reason: String| DatasetError::InvalidCell {
            path: table.path.clone(),
            row: row + 2,
            column: table.headers[col].clone(),
            value: table.cell(row, col).display(),
            reason,
        };

        let required = |column: Column| -> Result<usize, DatasetError> {
            schema.position(column).ok_or_else(|| DatasetError::MissingColumns {
                path: table.path.clone(),
                columns: vec![column.header(schema.profile).to_string()],
            })
        };

        let optional_number = |column: Column| -> Result<Option<f64>, DatasetError> {
            match schema.position(column) {
                Some(idx) => table
                    .cell(row, idx)
                    .to_number()
                    .map_err(|reason| invalid(idx, reason)),
                None => Ok(None),
            }
        };

        let required_number = |column: Column| -> Result<f64, DatasetError> {
            let idx = required(column)?;
            table
                .cell(row, idx)
                .to_number()
                .map_err(|reason| invalid(idx, reason))?
                .ok_or_else(|| invalid(idx, "missing value".to_string()))
        };

        let date_idx = required(Column::Date)?;
        let date = table
            .cell(row, date_idx)
            .to_date()
            .map_err(|reason| invalid(date_idx, reason))?;

        let product_idx = required(Column::Product)?;
        let product = table
            .cell(row, product_idx)
            .to_label()
            .ok_or_else(|| invalid(product_idx, "missing product".to_string()))?;

        let customer = schema
            .position(Column::Customer)
            .and_then(|idx| table.cell(row, idx).to_label());

        let quantity = optional_number(Column::Quantity)?;
        if let (Some(q), Some(idx)) = (quantity, schema.position(Column::Quantity)) {
            if q < 0.0 {
                return Err(invalid(idx, "quantity cannot be negative".to_string()));
            }
        }

        out.push(Transaction {
            date,
            product,
            customer,
            quantity,
            fob_price: required_number(Column::FobPrice)?,
            cfr_price: required_number(Column::CfrPrice)?,
            fx_rate: optional_number(Column::FxRate)?,
            corn_futures: optional_number(Column::CornFutures)?,
            soy_futures: optional_number(Column::SoyFutures)?,
            oil_quote: optional_number(Column::OilQuote)?,
        });
    }

    Ok(out)
}
