use crate::gui_bridge::model::BandSummary;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use fkcore::telemetry::MetricsSnapshot;
use fkcore::{validate, BandResult, FkEngine, RecordSet};

pub struct WorkflowResult {
    pub bands: Vec<BandResult>,
    pub summaries: Vec<BandSummary>,
    pub metrics: MetricsSnapshot,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self, records: RecordSet) -> anyhow::Result<WorkflowResult> {
        let input = validate(records, self.config.to_fk_config())
            .context("validating records against FK config")?;

        let engine = FkEngine::new();
        let bands = engine.run(input).context("running FK analysis")?;
        let summaries = bands.iter().map(BandSummary::from_result).collect();

        Ok(WorkflowResult {
            bands,
            summaries,
            metrics: engine.metrics(),
        })
    }
}
