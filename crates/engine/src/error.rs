use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The dataset could not be loaded; nothing can be rendered.
    #[error("Failed to load dataset: {0}")]
    Load(#[from] dataset::DatasetError),

    #[error("Invalid alert rule: {0}")]
    AlertRule(#[from] alerter::AlertError),
}

/// A selection that cannot be applied to the table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Date range starts on {start} but ends earlier, on {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
}
