use crate::generator::profile::{build_record_set, ScenarioConfig};
use crate::gui_bridge::model::VisualizationModel;
use crate::workflow::runner::{Runner, WorkflowResult};
use anyhow::{anyhow, Context, Result};
use log::{error, info};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

#[derive(Debug)]
struct WarpError;

impl warp::reject::Reject for WarpError {}

type SharedModel = Arc<RwLock<VisualizationModel>>;

fn store(state: &SharedModel, model: VisualizationModel) -> Result<()> {
    let mut guard = state
        .write()
        .map_err(|_| anyhow!("visualization state lock poisoned"))?;
    *guard = model;
    Ok(())
}

fn model_from(result: WorkflowResult, scenario: Option<String>) -> VisualizationModel {
    VisualizationModel {
        summaries: result.summaries,
        bands: result.bands,
        metrics: result.metrics,
        scenario,
    }
}

/// Bridge that serves the latest FK results to a local viewer.
pub struct GuiBridge {
    state: SharedModel,
}

impl GuiBridge {
    /// Creates the bridge without binding any socket.
    pub fn detached() -> Self {
        Self {
            state: Arc::new(RwLock::new(VisualizationModel::default())),
        }
    }

    /// Creates the bridge and serves `GET /results` and
    /// `POST /ingest-config` from a background thread.
    pub fn serve(runner: Arc<Runner>) -> Self {
        let bridge = Self::detached();
        let state_for_filter = bridge.state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());
        let runner_filter = warp::any().map(move || runner.clone());

        let get_route = warp::path("results")
            .and(warp::get())
            .and(state_filter.clone())
            .and_then(|state: SharedModel| async move {
                match state.read() {
                    Ok(guard) => Ok(warp::reply::json(&guard.summaries)),
                    Err(_) => Err(warp::reject::custom(WarpError)),
                }
            });

        let generator_route = warp::path("ingest-config")
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter)
            .and(runner_filter)
            .and_then(
                |config: ScenarioConfig, state: SharedModel, runner: Arc<Runner>| async move {
                    let outcome = build_record_set(&config)
                        .and_then(|records| runner.execute(records))
                        .and_then(|result| {
                            let peaks =
                                result.summaries.iter().filter(|s| s.peak.is_some()).count();
                            store(&state, model_from(result, config.scenario.clone()))?;
                            Ok(peaks)
                        });
                    match outcome {
                        Ok(peaks) => {
                            if let Some(name) = config.scenario.as_ref() {
                                info!("[GUI] scenario {} -> {} bands with peaks", name, peaks);
                            }
                            Ok::<_, warp::Rejection>(warp::reply::with_status(
                                warp::reply::json(&json!({
                                    "status": "ok",
                                    "bands_with_peaks": peaks,
                                    "description": config.description.clone().unwrap_or_default()
                                })),
                                StatusCode::OK,
                            ))
                        }
                        Err(err) => {
                            error!("ingest-config error: {:#}", err);
                            Err(warp::reject::custom(WarpError))
                        }
                    }
                },
            );

        thread::spawn(move || {
            let routes = get_route.or(generator_route);
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                warp::serve(routes).run(gui_bind_address()).await;
            });
        });

        bridge
    }

    pub fn publish(&self, result: WorkflowResult, scenario: Option<String>) -> Result<()> {
        let model = model_from(result, scenario);
        info!(
            "[GUI] bands: {}, frequency bins: {}",
            model.summaries.len(),
            model.metrics.frequency_bins
        );
        store(&self.state, model).context("publishing results")
    }

    pub fn publish_status(&self, message: &str) {
        info!("[GUI] {}", message);
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> Result<VisualizationModel> {
        self.state
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| anyhow!("visualization state lock poisoned"))
    }
}
