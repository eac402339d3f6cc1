//! Chart view-models: the data behind each panel chart, with no drawing.

use crate::state::Warning;
use analytics::{DailySeries, Estimate, ols};
use chrono::NaiveDate;
use core_types::{Capabilities, Column, EnrichedTransaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Daily mean FOB and CFR prices with a linear trend over the FOB series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTrendChart {
    pub fob: DailySeries,
    pub cfr: DailySeries,
    pub fob_trend: Option<Vec<(NaiveDate, f64)>>,
}

impl PriceTrendChart {
    pub fn build(rows: &[EnrichedTransaction], warnings: &mut Vec<Warning>) -> Option<Self> {
        if rows.is_empty() {
            return None;
        }
        let fob = DailySeries::mean_by_date(rows, Column::FobPrice);
        let cfr = DailySeries::mean_by_date(rows, Column::CfrPrice);
        let fob_trend = match fob.trend_line() {
            Ok(line) => Some(line),
            Err(e) => {
                warnings.push(Warning::TrendUnavailable {
                    reason: e.to_string(),
                });
                None
            }
        };
        Some(Self { fob, cfr, fob_trend })
    }
}

/// Daily means of the commodity reference prices the dataset carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommodityChart {
    pub series: Vec<DailySeries>,
}

impl CommodityChart {
    pub fn build(rows: &[EnrichedTransaction], caps: &Capabilities) -> Option<Self> {
        let series: Vec<DailySeries> = [Column::CornFutures, Column::SoyFutures, Column::OilQuote]
            .into_iter()
            .filter(|c| caps.supports(*c))
            .map(|c| DailySeries::mean_by_date(rows, c))
            .filter(|s| !s.is_empty())
            .collect();
        (!series.is_empty()).then_some(Self { series })
    }
}

/// Five-number summary using linear interpolation between order statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Quartiles {
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let q = |p: f64| {
            let h = (sorted.len() - 1) as f64 * p;
            let lo = h.floor() as usize;
            let hi = h.ceil() as usize;
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        };
        Some(Self {
            min: sorted[0],
            q1: q(0.25),
            median: q(0.5),
            q3: q(0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxGroup {
    pub product: String,
    pub quartiles: Quartiles,
    /// Every observation, for the "all points" overlay.
    pub points: Vec<(NaiveDate, f64)>,
}

/// FOB price distribution per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlot {
    pub groups: Vec<BoxGroup>,
}

impl BoxPlot {
    pub fn build(rows: &[EnrichedTransaction]) -> Option<Self> {
        let mut by_product: BTreeMap<&str, Vec<(NaiveDate, f64)>> = BTreeMap::new();
        for row in rows {
            by_product
                .entry(row.product())
                .or_default()
                .push((row.date(), row.record.fob_price));
        }
        let groups: Vec<BoxGroup> = by_product
            .into_iter()
            .filter_map(|(product, points)| {
                let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
                Some(BoxGroup {
                    product: product.to_string(),
                    quartiles: Quartiles::of(&values)?,
                    points,
                })
            })
            .collect();
        (!groups.is_empty()).then_some(Self { groups })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub date: NaiveDate,
    pub x: f64,
    pub y: f64,
}

/// The points of one product and their least-squares line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub product: String,
    pub points: Vec<ScatterPoint>,
    pub fit: Estimate,
}

/// Price against a market variable, one series and trend line per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterChart {
    pub x: Column,
    pub y: Column,
    pub x_options: Vec<Column>,
    pub y_options: Vec<Column>,
    pub series: Vec<ScatterSeries>,
}

impl ScatterChart {
    /// Price columns selectable on the vertical axis.
    pub const Y_OPTIONS: [Column; 2] = [Column::FobPrice, Column::CfrPrice];

    /// Builds the chart for the requested axes, substituting the first
    /// available option (with a warning) when a request cannot be honoured.
    pub fn build(
        rows: &[EnrichedTransaction],
        caps: &Capabilities,
        requested_x: Option<Column>,
        requested_y: Option<Column>,
        warnings: &mut Vec<Warning>,
    ) -> Option<Self> {
        let x_options: Vec<Column> = caps
            .market_variables()
            .into_iter()
            .filter(|c| *c != Column::FobPrice)
            .collect();
        let y_options = Self::Y_OPTIONS.to_vec();

        let x = pick_axis(requested_x, &x_options, warnings)?;
        let y = pick_axis(requested_y, &y_options, warnings)?;

        let mut by_product: BTreeMap<&str, Vec<ScatterPoint>> = BTreeMap::new();
        for row in rows {
            if let (Some(xv), Some(yv)) = (row.value(x), row.value(y)) {
                by_product.entry(row.product()).or_default().push(ScatterPoint {
                    date: row.date(),
                    x: xv,
                    y: yv,
                });
            }
        }

        let series = by_product
            .into_iter()
            .map(|(product, points)| {
                let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
                let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
                ScatterSeries {
                    product: product.to_string(),
                    fit: ols(&xs, &ys, "scatter trend line").into(),
                    points,
                }
            })
            .collect();

        Some(Self {
            x,
            y,
            x_options,
            y_options,
            series,
        })
    }
}

fn pick_axis(requested: Option<Column>, options: &[Column], warnings: &mut Vec<Warning>) -> Option<Column> {
    let fallback = *options.first()?;
    match requested {
        Some(col) if options.contains(&col) => Some(col),
        Some(col) => {
            warnings.push(Warning::ScatterAxisUnavailable {
                requested: col,
                used: fallback,
            });
            Some(fallback)
        }
        None => Some(fallback),
    }
}
