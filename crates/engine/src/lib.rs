//! # Pricing Panel Engine
//!
//! Turns a selection on the panel into everything the panel shows. A UI
//! adapter (CLI, HTTP, test harness) builds a [`FilterState`], hands it to
//! [`Pipeline::render`] and draws the returned [`RenderState`].
//!
//! ## Flow
//!
//! 1. Load the dataset through the [`dataset::DatasetCache`].
//! 2. Derive the local-currency fields (memoized per loaded dataset).
//! 3. Apply the selection, falling back to the whole table on a bad filter.
//! 4. Compute KPIs, chart view-models, regressions, the simulator estimate
//!    and the price alert.
//!
//! Only step 1 can fail the render; everything after it degrades into a
//! [`Warning`].

pub mod charts;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod simulator;
pub mod state;

pub use charts::{BoxPlot, CommodityChart, PriceTrendChart, Quartiles, ScatterChart};
pub use error::{EngineError, FilterError};
pub use filter::FilterEngine;
pub use pipeline::{DashboardOptions, Pipeline};
pub use simulator::{PricingSimulator, SimulationResult, SimulatorInputs, SliderOptions};
pub use state::{DateRange, FilterState, RenderState, Warning};
