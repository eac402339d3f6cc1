use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-way classification produced by the trailing-window alert rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    High,
    Low,
    Normal,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertLevel::High => "HIGH",
            AlertLevel::Low => "LOW",
            AlertLevel::Normal => "NORMAL",
        };
        f.write_str(s)
    }
}

/// The column convention a source file was written with.
///
/// Both profiles carry the same record shape but name the traded quantity
/// differently. A loaded dataset remembers which profile it came from, and
/// datasets of different profiles are never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaProfile {
    /// The commercial panel workbook (`Quantidade comercializada`).
    Commercial,
    /// The consolidated per-product dataset (`Quantidade (t)`).
    Consolidated,
}

impl SchemaProfile {
    pub fn quantity_header(&self) -> &'static str {
        match self {
            SchemaProfile::Commercial => "Quantidade comercializada",
            SchemaProfile::Consolidated => "Quantidade (t)",
        }
    }
}

/// Which of the two dashboard panels is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardVariant {
    /// Market overview: KPIs, trends, correlations, customers, simulator, alerts.
    #[default]
    Market,
    /// Single-product view: product selector plus elasticity and FX pass-through.
    Product,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_level_serializes_uppercase() {
        let json = serde_json::to_string(&AlertLevel::High).unwrap();
        assert_eq!(json, "\"HIGH\"");
        assert_eq!(AlertLevel::Low.to_string(), "LOW");
    }

    #[test]
    fn profiles_name_quantity_differently() {
        assert_ne!(
            SchemaProfile::Commercial.quantity_header(),
            SchemaProfile::Consolidated.quantity_header()
        );
    }
}
