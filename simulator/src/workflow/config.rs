use anyhow::Context;
use fkcore::{CenterMode, FkConfig, FrequencyBand, GridResolution};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::generator::profile::ScenarioConfig;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub fk: FkConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        max_slowness: f64,
        resolution: &[usize],
        bands: &[FrequencyBand],
        polar: bool,
        center: CenterMode,
    ) -> anyhow::Result<Self> {
        let grid_resolution = match resolution {
            [single] => GridResolution::Single(*single),
            [radial, backazimuth] => GridResolution::Pair([*radial, *backazimuth]),
            other => anyhow::bail!("expected one or two resolution values, got {}", other.len()),
        };
        Ok(Self {
            fk: FkConfig {
                max_slowness,
                grid_resolution,
                frequency_bands: bands.to_vec(),
                polar,
                center,
            },
            scenario: ScenarioConfig::default(),
        })
    }

    pub fn to_fk_config(&self) -> FkConfig {
        self.fk.clone()
    }
}

/// Parses a `low,high` band argument.
pub fn parse_band(value: &str) -> Result<FrequencyBand, String> {
    let (low, high) = value
        .split_once(',')
        .ok_or_else(|| format!("expected 'low,high', got '{}'", value))?;
    let low = low.trim().parse::<f64>().map_err(|err| err.to_string())?;
    let high = high.trim().parse::<f64>().map_err(|err| err.to_string())?;
    Ok(FrequencyBand::new(low, high))
}
