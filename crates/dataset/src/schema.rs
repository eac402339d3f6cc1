use crate::error::DatasetError;
use crate::reader::RawTable;
use core_types::{Capabilities, Column, SchemaProfile};
use std::collections::BTreeMap;

/// The result of matching a table's headers against the declared schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    pub profile: SchemaProfile,
    pub positions: BTreeMap<Column, usize>,
    pub capabilities: Capabilities,
}

impl ResolvedSchema {
    /// Matches `table`'s headers, failing with every missing required column
    /// listed at once.
    pub fn resolve(table: &RawTable) -> Result<Self, DatasetError> {
        let profile = detect_profile(table)?;

        let mut positions = BTreeMap::new();
        let mut missing = Vec::new();

        for column in Column::REQUIRED {
            match table.position(column.header(profile)) {
                Some(idx) => {
                    positions.insert(column, idx);
                }
                None => missing.push(column.header(profile).to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(DatasetError::MissingColumns {
                path: table.path.clone(),
                columns: missing,
            });
        }

        for column in Column::OPTIONAL {
            if let Some(idx) = table.position(column.header(profile)) {
                positions.insert(column, idx);
            }
        }

        let present: Vec<Column> = positions.keys().copied().collect();
        Ok(Self {
            profile,
            capabilities: Capabilities::from_columns(&present),
            positions,
        })
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions.get(&column).copied()
    }
}

fn detect_profile(table: &RawTable) -> Result<SchemaProfile, DatasetError> {
    let commercial = SchemaProfile::Commercial.quantity_header();
    let consolidated = SchemaProfile::Consolidated.quantity_header();

    match (table.position(commercial), table.position(consolidated)) {
        (Some(_), Some(_)) => Err(DatasetError::AmbiguousProfile {
            path: table.path.clone(),
            first: commercial,
            second: consolidated,
        }),
        (None, Some(_)) => Ok(SchemaProfile::Consolidated),
        _ => Ok(SchemaProfile::Commercial),
    }
}
