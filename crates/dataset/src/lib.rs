//! # Dataset
//!
//! Loading of the transaction table behind the pricing panel.
//!
//! The primary dataset is a workbook or CSV with one row per sale. Its headers
//! are matched once against the declared schema (`core_types::Column`), which
//! yields the source's [`SchemaProfile`](core_types::SchemaProfile) and the
//! capability flags of its optional columns. Companion CSVs with daily oil
//! quotes and soy/corn futures are joined on the calendar date.
//!
//! Any missing file, missing required column or unparseable required cell is a
//! [`DatasetError`]; nothing is silently dropped.

pub mod cache;
pub mod cell;
pub mod error;
pub mod loader;
pub mod quotes;
pub mod reader;
pub mod schema;

pub use cache::DatasetCache;
pub use error::DatasetError;
pub use loader::{Dataset, DatasetLoader, DatasetSource};
pub use schema::ResolvedSchema;
