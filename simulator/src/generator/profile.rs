use anyhow::{ensure, Context};
use fkcore::math::geodesy::{slowness_deg_to_km, GeoPoint, InverseGeodesic, SphericalEarth};
use fkcore::{RecordSet, StationRecord};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::generator::template::gaussian_pulse;

/// Configuration for generating a synthetic plane-wave record set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Station `[latitude, longitude]` pairs in degrees.
    pub stations: Vec<[f64; 2]>,
    pub sample_interval: f64,
    pub sample_count: usize,
    pub start_time: f64,
    /// Horizontal slowness of the injected wave, s/deg.
    pub slowness: f64,
    /// Direction toward the source, degrees from north.
    pub backazimuth: f64,
    pub frequency: f64,
    /// Envelope half-width in seconds.
    pub pulse_width: f64,
    pub noise: f64,
    pub seed: u64,
    pub description: Option<String>,
    pub scenario: Option<String>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            stations: vec![[0.0, 0.0], [0.0, 1.0], [0.9, 0.4], [-0.6, 0.7]],
            sample_interval: 1.0,
            sample_count: 128,
            start_time: 0.0,
            slowness: 5.0,
            backazimuth: 126.87,
            frequency: 0.1,
            pulse_width: 12.0,
            noise: 0.0,
            seed: 0,
            description: None,
            scenario: None,
        }
    }
}

impl ScenarioConfig {
    /// Slowness vector pointing toward the source, s/km (east, north).
    fn slowness_vector(&self) -> (f64, f64) {
        let magnitude = slowness_deg_to_km(self.slowness);
        let baz = self.backazimuth.to_radians();
        (magnitude * baz.sin(), magnitude * baz.cos())
    }
}

fn build_station(
    config: &ScenarioConfig,
    index: usize,
    origin: GeoPoint,
    position: GeoPoint,
    rng: &mut StdRng,
) -> StationRecord {
    let inverse = SphericalEarth.inverse(origin, position);
    let azimuth = inverse.azimuth_deg.to_radians();
    let (east, north) = config.slowness_vector();
    let (x, y) = (
        inverse.distance_km * azimuth.sin(),
        inverse.distance_km * azimuth.cos(),
    );
    let delay = -(east * x + north * y);

    let centre = 0.5 * config.sample_count as f64 * config.sample_interval;
    let samples = (0..config.sample_count)
        .map(|n| {
            let t = n as f64 * config.sample_interval - centre - delay;
            let jitter = if config.noise > 0.0 {
                rng.gen_range(-config.noise..config.noise)
            } else {
                0.0
            };
            gaussian_pulse(t, config.frequency, config.pulse_width) + jitter
        })
        .collect();

    StationRecord::new(
        format!("SYN{:02}", index),
        position,
        config.sample_interval,
        config.start_time,
        samples,
    )
}

/// Builds one record per configured station carrying the same plane wave,
/// delayed according to the station's offset from the first station.
pub fn build_record_set(config: &ScenarioConfig) -> anyhow::Result<RecordSet> {
    ensure!(!config.stations.is_empty(), "scenario has no stations");
    ensure!(
        config.sample_interval > 0.0,
        "scenario sample interval must be positive"
    );

    let positions: Vec<GeoPoint> = config
        .stations
        .iter()
        .map(|&[lat, lon]| GeoPoint::new(lat, lon))
        .collect();
    let origin = *positions.first().context("scenario has no stations")?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let records = positions
        .iter()
        .enumerate()
        .map(|(index, &position)| build_station(config, index, origin, position, &mut rng))
        .collect();

    Ok(RecordSet::new(records))
}
