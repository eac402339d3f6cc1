pub mod enums;
pub mod error;
pub mod schema;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{AlertLevel, DashboardVariant, SchemaProfile};
pub use error::CoreError;
pub use schema::{Capabilities, Column};
pub use structs::{DatasetSummary, EnrichedTransaction, Transaction};
