use fkcore::telemetry::MetricsSnapshot;
use fkcore::{BandResult, PeakEstimate};
use serde::{Deserialize, Serialize};

/// Compact description of one band result for the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandSummary {
    pub band: [f64; 2],
    pub frequency_count: usize,
    pub grid_shape: [usize; 2],
    pub normalization_db: f64,
    pub center: String,
    pub polar: bool,
    pub peak: Option<PeakEstimate>,
    pub warning: Option<String>,
}

impl BandSummary {
    pub fn from_result(result: &BandResult) -> Self {
        Self {
            band: result.band.into(),
            frequency_count: result.frequencies.len(),
            grid_shape: [result.x.len(), result.y.len()],
            normalization_db: result.normalization_db,
            center: result.center.to_string(),
            polar: result.polar,
            peak: result.peak(),
            warning: result.warning.as_ref().map(ToString::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationModel {
    pub summaries: Vec<BandSummary>,
    pub bands: Vec<BandResult>,
    pub metrics: MetricsSnapshot,
    pub scenario: Option<String>,
}
