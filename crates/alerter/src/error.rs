use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum AlertError {
    #[error("Observation on {date} is not a finite number")]
    NonFiniteObservation { date: NaiveDate },

    #[error("Alert rule is misconfigured: {0}")]
    InvalidRule(String),
}
