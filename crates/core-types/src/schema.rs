use crate::enums::SchemaProfile;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A canonical column of the transaction table.
///
/// Source headers are resolved to these once, at load time. Everything
/// downstream addresses data through `Column`, never through header strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Date,
    Product,
    Customer,
    Quantity,
    FobPrice,
    CfrPrice,
    FxRate,
    CornFutures,
    SoyFutures,
    OilQuote,
}

impl Column {
    /// Columns a dataset must carry to be loaded at all.
    pub const REQUIRED: [Column; 4] = [
        Column::Date,
        Column::Product,
        Column::FobPrice,
        Column::CfrPrice,
    ];

    /// Columns that may be absent; their presence sets a capability flag.
    pub const OPTIONAL: [Column; 6] = [
        Column::Customer,
        Column::Quantity,
        Column::FxRate,
        Column::CornFutures,
        Column::SoyFutures,
        Column::OilQuote,
    ];

    /// Numeric market variables offered for correlation and scatter analysis,
    /// in display order.
    pub const MARKET_VARIABLES: [Column; 6] = [
        Column::FobPrice,
        Column::CfrPrice,
        Column::FxRate,
        Column::OilQuote,
        Column::CornFutures,
        Column::SoyFutures,
    ];

    /// The header this column carries in source files of the given profile.
    pub fn header(&self, profile: SchemaProfile) -> &'static str {
        match self {
            Column::Date => "Data",
            Column::Product => "Produto",
            Column::Customer => "Cliente",
            Column::Quantity => profile.quantity_header(),
            Column::FobPrice => "Preço FOB ($/t)",
            Column::CfrPrice => "CFR ($/t)",
            Column::FxRate => "Câmbio (R$/US$)",
            Column::CornFutures => "FuturoMilho",
            Column::SoyFutures => "FuturoSoja",
            Column::OilQuote => "CotacaoPetroleo",
        }
    }

    /// Human readable label used by tables and chart axes.
    pub fn label(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Product => "Product",
            Column::Customer => "Customer",
            Column::Quantity => "Quantity (t)",
            Column::FobPrice => "FOB price ($/t)",
            Column::CfrPrice => "CFR price ($/t)",
            Column::FxRate => "FX (R$/US$)",
            Column::CornFutures => "Corn futures",
            Column::SoyFutures => "Soy futures",
            Column::OilQuote => "Oil quote",
        }
    }
}

impl FromStr for Column {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let column = match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "date" => Column::Date,
            "product" => Column::Product,
            "customer" => Column::Customer,
            "quantity" => Column::Quantity,
            "fob" | "fob_price" => Column::FobPrice,
            "cfr" | "cfr_price" => Column::CfrPrice,
            "fx" | "fx_rate" => Column::FxRate,
            "corn" | "corn_futures" => Column::CornFutures,
            "soy" | "soy_futures" => Column::SoyFutures,
            "oil" | "oil_quote" => Column::OilQuote,
            other => {
                return Err(CoreError::UnknownVariant {
                    kind: "column",
                    value: other.to_string(),
                });
            }
        };
        Ok(column)
    }
}

/// Which optional columns a loaded dataset actually carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub customer: bool,
    pub quantity: bool,
    pub fx_rate: bool,
    pub corn_futures: bool,
    pub soy_futures: bool,
    pub oil_quote: bool,
}

impl Capabilities {
    /// Builds the flags from the set of resolved columns.
    pub fn from_columns(columns: &[Column]) -> Self {
        let mut caps = Self::default();
        for column in columns {
            caps.enable(*column);
        }
        caps
    }

    pub fn enable(&mut self, column: Column) {
        match column {
            Column::Customer => self.customer = true,
            Column::Quantity => self.quantity = true,
            Column::FxRate => self.fx_rate = true,
            Column::CornFutures => self.corn_futures = true,
            Column::SoyFutures => self.soy_futures = true,
            Column::OilQuote => self.oil_quote = true,
            _ => {}
        }
    }

    /// Required columns are always supported; optional ones follow the flags.
    pub fn supports(&self, column: Column) -> bool {
        match column {
            Column::Date | Column::Product | Column::FobPrice | Column::CfrPrice => true,
            Column::Customer => self.customer,
            Column::Quantity => self.quantity,
            Column::FxRate => self.fx_rate,
            Column::CornFutures => self.corn_futures,
            Column::SoyFutures => self.soy_futures,
            Column::OilQuote => self.oil_quote,
        }
    }

    /// The market variables present in this dataset, in display order.
    pub fn market_variables(&self) -> Vec<Column> {
        Column::MARKET_VARIABLES
            .into_iter()
            .filter(|c| self.supports(*c))
            .collect()
    }
}
