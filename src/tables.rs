//! Terminal rendering of a [`RenderState`].

use analytics::{Estimate, MetricResult};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use engine::{RenderState, SimulationResult, Warning};

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn num(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.decimals$}"))
}

fn estimate(estimate: &Estimate) -> String {
    match estimate {
        Estimate::Fitted(fit) => format!(
            "{:.4} (R² {:.3}, n={})",
            fit.slope, fit.r_squared, fit.observations
        ),
        Estimate::InsufficientData { needed, found } => {
            format!("insufficient data ({found} of {needed})")
        }
        Estimate::Unavailable { reason } => format!("unavailable: {reason}"),
    }
}

pub fn print_panel(state: &RenderState) {
    let summary = &state.summary;
    println!(
        "{} rows, {} products, {} to {} ({:?} layout)",
        summary.rows,
        summary.products.len(),
        summary.first_date.map_or_else(|| "-".to_string(), |d| d.to_string()),
        summary.last_date.map_or_else(|| "-".to_string(), |d| d.to_string()),
        state.profile,
    );

    let k = &state.kpis;
    let mut kpis = table(vec!["Indicator", "Value"]);
    kpis.add_row(vec!["Transactions".to_string(), k.transactions.to_string()]);
    kpis.add_row(vec!["Mean FOB price ($/t)".to_string(), num(k.mean_fob_price, 2)]);
    kpis.add_row(vec!["Total volume (t)".to_string(), num(k.total_volume, 0)]);
    kpis.add_row(vec!["CFR margin (%)".to_string(), num(k.cfr_margin_pct, 1)]);
    kpis.add_row(vec!["Mean FX (R$/US$)".to_string(), num(k.mean_fx_rate, 4)]);
    kpis.add_row(vec!["FOB value (R$)".to_string(), num(k.total_fob_value_local, 2)]);
    kpis.add_row(vec!["CFR value (R$)".to_string(), num(k.total_cfr_value_local, 2)]);
    println!("{kpis}");

    if let Some(metrics) = &state.product_metrics {
        print_metrics(metrics);
    }

    if !state.product_stats.is_empty() {
        let mut stats = table(vec!["Product", "Column", "n", "Mean", "Std", "Min", "Max"]);
        for group in &state.product_stats {
            for (column, s) in &group.columns {
                stats.add_row(vec![
                    group.product.clone(),
                    column.label().to_string(),
                    s.count.to_string(),
                    num(s.mean, 2),
                    num(s.std, 2),
                    num(s.min, 2),
                    num(s.max, 2),
                ]);
            }
        }
        println!("{stats}");
    }

    if let Some(corr) = &state.correlations {
        let mut header = vec![""];
        header.extend(corr.columns.iter().map(|c| c.label()));
        let mut matrix = table(header);
        for (column, row) in corr.columns.iter().zip(&corr.values) {
            let mut cells = vec![column.label().to_string()];
            cells.extend(row.iter().map(|v| num(*v, 2)));
            matrix.add_row(cells);
        }
        println!("{matrix}");
    }

    if let Some(scatter) = &state.scatter {
        let slope = format!("Slope of {} on {}", scatter.y.label(), scatter.x.label());
        let mut fits = table(vec!["Product", "Points", slope.as_str()]);
        for series in &scatter.series {
            fits.add_row(vec![
                series.product.clone(),
                series.points.len().to_string(),
                estimate(&series.fit),
            ]);
        }
        println!("{fits}");
    }

    if !state.top_customers.is_empty() {
        let mut customers = table(vec!["Customer", "Volume (t)"]);
        for c in &state.top_customers {
            customers.add_row(vec![c.customer.clone(), format!("{:.0}", c.volume)]);
        }
        println!("{customers}");
    }

    match &state.alert {
        Some(alert) => println!("{}", alert.message()),
        None => println!("Not enough observations for a price alert."),
    }
    print_simulation(&state.simulation, &state.warnings);
}

fn print_metrics(metrics: &MetricResult) {
    let mut out = table(vec!["Product", "Observations", "Elasticity", "FX pass-through", "Mean FOB"]);
    out.add_row(vec![
        metrics.product.clone(),
        metrics.observations.to_string(),
        estimate(&metrics.elasticity),
        estimate(&metrics.pass_through),
        num(metrics.mean_fob_price, 2),
    ]);
    println!("{out}");
}

pub fn print_simulation(result: &SimulationResult, warnings: &[Warning]) {
    let inputs = &result.inputs;
    println!(
        "Simulated FOB price: {} $/t (FX {}, oil {}, soy {})",
        result.estimated_price.round_dp(2),
        inputs.fx,
        inputs.oil,
        inputs.soy
    );
    for warning in warnings {
        println!("warning: {}", warning.message());
    }
}
