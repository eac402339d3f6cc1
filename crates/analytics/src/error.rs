use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to fit {what}: need at least {needed} valid rows, found {found}")]
    InsufficientData {
        what: &'static str,
        needed: usize,
        found: usize,
    },

    #[error("Cannot fit {0}: the regressor is constant across all rows")]
    ConstantRegressor(&'static str),

    #[error("Error in calculation: {0}")]
    Calculation(String),
}
