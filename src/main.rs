use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use configuration::{Config, LogFormat};
use core_types::{Column, DashboardVariant};
use engine::{DateRange, FilterState, Pipeline, SimulatorInputs};
use rust_decimal::Decimal;
use std::net::SocketAddr;
use std::path::PathBuf;

mod tables;

/// The main entry point for the pricing panel.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // PRICING__* overrides may live in a local .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = configuration::load_config(&cli.config)?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    let _log_guard = configuration::init_logging(&config.logging)?;

    match cli.command {
        Commands::Report(args) => handle_report(config, args, DashboardVariant::Market),
        Commands::Product(args) => {
            let filter = FilterArgs {
                focus: args.product.or(args.filter.focus),
                ..args.filter
            };
            handle_report(config, filter, DashboardVariant::Product)
        }
        Commands::Simulate(args) => handle_simulate(config, args),
        Commands::Serve(args) => {
            if let Some(addr) = args.addr {
                config.server.addr = addr;
            }
            web_server::run_server(config).await
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Commodity pricing panel: KPIs, regressions, alerts and a price simulator
/// over a fertilizer transaction dataset.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file (optional).
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Console log layout; overrides the configuration file.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the market panel for a selection.
    Report(FilterArgs),
    /// Render the per-product panel with elasticity and FX pass-through.
    Product(ProductArgs),
    /// Price a what-if scenario.
    Simulate(SimulateArgs),
    /// Start the HTTP adapter.
    Serve(ServeArgs),
}

#[derive(Args, Clone)]
struct FilterArgs {
    /// Restrict to these products (repeatable).
    #[arg(long = "filter-product")]
    products: Vec<String>,

    /// Restrict to these customers (repeatable).
    #[arg(long = "customer")]
    customers: Vec<String>,

    /// First date of the period (YYYY-MM-DD).
    #[arg(long, requires = "to")]
    from: Option<NaiveDate>,

    /// Last date of the period (YYYY-MM-DD).
    #[arg(long, requires = "from")]
    to: Option<NaiveDate>,

    /// Product whose regressions are reported.
    #[arg(long = "focus")]
    focus: Option<String>,

    /// Scatter horizontal axis (cfr, fx, oil, corn, soy).
    #[arg(long)]
    scatter_x: Option<Column>,

    /// Scatter vertical axis (fob or cfr).
    #[arg(long)]
    scatter_y: Option<Column>,

    /// Override the primary dataset path.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Print the render state as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ProductArgs {
    /// The product to analyse; the first product of the dataset when omitted.
    #[arg(long)]
    product: Option<String>,

    #[command(flatten)]
    filter: FilterArgs,
}

#[derive(Args)]
struct SimulateArgs {
    /// FX rate, R$/US$.
    #[arg(long)]
    fx: Option<Decimal>,
    /// Oil price, US$/barrel.
    #[arg(long)]
    oil: Option<Decimal>,
    /// Soy futures, US$/bushel.
    #[arg(long)]
    soy: Option<Decimal>,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address; overrides the configuration file.
    #[arg(long)]
    addr: Option<SocketAddr>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_report(mut config: Config, args: FilterArgs, variant: DashboardVariant) -> anyhow::Result<()> {
    if let Some(path) = args.data {
        config.data.primary = path;
    }
    let mut pipeline = Pipeline::new(&config)?;

    let state = FilterState {
        variant,
        products: args.products,
        customers: args.customers,
        date_range: args.from.zip(args.to).map(|(start, end)| DateRange::new(start, end)),
        focus_product: args.focus,
        scatter_x: args.scatter_x,
        scatter_y: args.scatter_y,
        ..FilterState::default()
    };
    tracing::debug!(?state, "Rendering panel.");
    let rendered = pipeline.render(&state)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        tables::print_panel(&rendered);
    }
    Ok(())
}

fn handle_simulate(config: Config, args: SimulateArgs) -> anyhow::Result<()> {
    let simulator = engine::PricingSimulator::new(config.simulator);
    let defaults = simulator.default_inputs();
    let inputs = SimulatorInputs {
        fx: args.fx.unwrap_or(defaults.fx),
        oil: args.oil.unwrap_or(defaults.oil),
        soy: args.soy.unwrap_or(defaults.soy),
    };
    let (result, warnings) = simulator.estimate(&inputs);
    tables::print_simulation(&result, &warnings);
    Ok(())
}
