use axum::{
    Router,
    routing::{get, post},
};
use configuration::Config;
use engine::{Pipeline, PricingSimulator};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
pub struct AppState {
    /// Renders are serialized; the pipeline owns the dataset cache.
    pub pipeline: Mutex<Pipeline>,
    pub simulator: PricingSimulator,
}

impl AppState {
    pub fn new(config: &Config, pipeline: Pipeline) -> Self {
        Self {
            pipeline: Mutex::new(pipeline),
            simulator: PricingSimulator::new(config.simulator.clone()),
        }
    }
}

/// Builds the HTTP routes over an already constructed state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/options", get(handlers::get_options))
        .route("/api/dashboard", post(handlers::render_dashboard))
        .route("/api/simulate", post(handlers::simulate))
        .route("/api/reload", post(handlers::reload))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Configures and runs the web server until it is stopped.
///
/// Logging is initialized by the caller.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(&config)?;
    let state = Arc::new(AppState::new(&config, pipeline));
    let app = router(state);

    let addr = config.server.addr;
    tracing::info!(%addr, data = %config.data.primary.display(), "Web server listening.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
