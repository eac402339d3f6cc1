//! # Pricing Analytics
//!
//! The computational core of the pricing panel: derived fields, descriptive
//! statistics and the two regressions (price elasticity of volume and FX
//! pass-through).
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O. Everything here is a function of the transaction
//!   rows handed in, so it is trivially testable.
//! - **No silent NaN:** an undefined regression is an `AnalyticsError`, turned
//!   into an [`Estimate`] variant for presentation, never a NaN coefficient.
//!
//! ## Public API
//!
//! - [`derive_fields`]: daily mean FX and local-currency transaction values.
//! - [`MetricsEngine`]: regressions, KPIs, grouped statistics, correlations.
//! - [`DailySeries`]: per-date means and their linear trend.

pub mod daily;
pub mod derived;
pub mod engine;
pub mod error;
pub mod regression;
pub mod report;
pub mod stats;

pub use daily::DailySeries;
pub use derived::{daily_mean_fx, derive_fields};
pub use engine::MetricsEngine;
pub use error::AnalyticsError;
pub use regression::{LinearFit, ols};
pub use report::{CorrelationMatrix, CustomerVolume, Estimate, Kpis, MetricResult, ProductStats};
pub use stats::Summary;
