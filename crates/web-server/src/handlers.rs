use crate::{AppState, error::AppError};
use axum::{Json, extract::State};
use engine::{
    DashboardOptions, EngineError, FilterState, Pipeline, RenderState, SimulationResult,
    SimulatorInputs, Warning,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub simulation: SimulationResult,
    pub warnings: Vec<Warning>,
}

/// Runs `f` against the shared pipeline on the blocking pool.
///
/// Loading a spreadsheet and fitting regressions are synchronous work, so
/// they stay off the async workers.
async fn with_pipeline<T, F>(state: Arc<AppState>, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&mut Pipeline) -> Result<T, EngineError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        let mut pipeline = state.pipeline.blocking_lock();
        f(&mut pipeline)
    })
    .await?;
    Ok(result?)
}

/// # GET /api/options
/// Products, customers, date bounds and the selectable chart axes.
pub async fn get_options(State(state): State<Arc<AppState>>) -> Result<Json<DashboardOptions>, AppError> {
    let options = with_pipeline(state, |p| p.options()).await?;
    Ok(Json(options))
}

/// # POST /api/dashboard
/// Renders the panel for the posted selection.
pub async fn render_dashboard(
    State(state): State<Arc<AppState>>,
    Json(filter): Json<FilterState>,
) -> Result<Json<RenderState>, AppError> {
    let rendered = with_pipeline(state, move |p| p.render(&filter)).await?;
    Ok(Json(rendered))
}

/// # POST /api/simulate
/// Prices a scenario without touching the dataset.
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(inputs): Json<SimulatorInputs>,
) -> Json<SimulateResponse> {
    let (simulation, warnings) = state.simulator.estimate(&inputs);
    Json(SimulateResponse {
        simulation,
        warnings,
    })
}

/// # POST /api/reload
/// Drops the cached dataset and loads the files again.
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<DashboardOptions>, AppError> {
    let options = with_pipeline(state, |p| {
        p.reload();
        p.options()
    })
    .await?;
    tracing::info!(rows = options.summary.rows, "Dataset reloaded.");
    Ok(Json(options))
}
