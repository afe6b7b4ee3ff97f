//! User-facing FK configuration and the fail-fast validator.
//!
//! `validate` is the only way to obtain a [`ValidatedInput`], and the engine
//! only accepts a `ValidatedInput`. Every consistency check therefore runs
//! before any transform or projection is computed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::math::geodesy::slowness_deg_to_km;
use crate::prelude::{FkError, FkResult};
use crate::records::RecordSet;

/// Backazimuth steps used by polar grids when only one resolution is given.
pub const DEFAULT_BACKAZIMUTH_POINTS: usize = 181;

/// How station pairs are referenced when building position vectors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "CenterSpec", into = "CenterSpec")]
pub enum CenterMode {
    /// Every unordered pair of distinct stations.
    #[default]
    Coarray,
    /// Every ordered pair, self-pairs included.
    Full,
    /// Each station against the network centroid.
    Center,
    /// Each station against a caller-supplied reference point.
    Explicit { latitude: f64, longitude: f64 },
}

impl CenterMode {
    /// Only the coarray keeps the real part of the beam response; `full`
    /// uses the squared magnitude like the centered modes.
    pub fn uses_real_part(&self) -> bool {
        matches!(self, CenterMode::Coarray)
    }

    pub fn is_centered(&self) -> bool {
        matches!(self, CenterMode::Center | CenterMode::Explicit { .. })
    }
}

impl FromStr for CenterMode {
    type Err = FkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "coarray" => Ok(CenterMode::Coarray),
            "full" => Ok(CenterMode::Full),
            "center" => Ok(CenterMode::Center),
            _ => {
                let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
                if let [lat, lon] = parts.as_slice() {
                    let latitude = lat.parse::<f64>().map_err(|_| unknown_center(trimmed))?;
                    let longitude = lon.parse::<f64>().map_err(|_| unknown_center(trimmed))?;
                    Ok(CenterMode::Explicit {
                        latitude,
                        longitude,
                    })
                } else {
                    Err(unknown_center(trimmed))
                }
            }
        }
    }
}

fn unknown_center(value: &str) -> FkError {
    FkError::Configuration(format!(
        "center must be coarray, full, center or 'lat,lon', got '{}'",
        value
    ))
}

impl fmt::Display for CenterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CenterMode::Coarray => write!(f, "coarray"),
            CenterMode::Full => write!(f, "full"),
            CenterMode::Center => write!(f, "center"),
            CenterMode::Explicit {
                latitude,
                longitude,
            } => write!(f, "{},{}", latitude, longitude),
        }
    }
}

/// Serialized form of [`CenterMode`]: a name or a `[lat, lon]` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CenterSpec {
    Named(String),
    Point([f64; 2]),
}

impl TryFrom<CenterSpec> for CenterMode {
    type Error = FkError;

    fn try_from(spec: CenterSpec) -> Result<Self, Self::Error> {
        match spec {
            CenterSpec::Named(name) => name.parse(),
            CenterSpec::Point([latitude, longitude]) => Ok(CenterMode::Explicit {
                latitude,
                longitude,
            }),
        }
    }
}

impl From<CenterMode> for CenterSpec {
    fn from(mode: CenterMode) -> Self {
        match mode {
            CenterMode::Explicit {
                latitude,
                longitude,
            } => CenterSpec::Point([latitude, longitude]),
            other => CenterSpec::Named(other.to_string()),
        }
    }
}

/// Grid resolution as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridResolution {
    Single(usize),
    /// `[radial, backazimuth]`, polar grids only.
    Pair([usize; 2]),
}

impl Default for GridResolution {
    fn default() -> Self {
        GridResolution::Single(81)
    }
}

/// Inclusive frequency band in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct FrequencyBand {
    pub low: f64,
    pub high: f64,
}

impl FrequencyBand {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, frequency: f64) -> bool {
        frequency >= self.low && frequency <= self.high
    }
}

impl From<[f64; 2]> for FrequencyBand {
    fn from([low, high]: [f64; 2]) -> Self {
        Self { low, high }
    }
}

impl From<FrequencyBand> for [f64; 2] {
    fn from(band: FrequencyBand) -> Self {
        [band.low, band.high]
    }
}

/// Raw FK parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FkConfig {
    /// Maximum slowness searched, s/deg.
    pub max_slowness: f64,
    pub grid_resolution: GridResolution,
    pub frequency_bands: Vec<FrequencyBand>,
    #[serde(default)]
    pub polar: bool,
    #[serde(default)]
    pub center: CenterMode,
}

impl FkConfig {
    pub fn new(max_slowness: f64, grid_resolution: usize, bands: Vec<FrequencyBand>) -> Self {
        Self {
            max_slowness,
            grid_resolution: GridResolution::Single(grid_resolution),
            frequency_bands: bands,
            polar: false,
            center: CenterMode::default(),
        }
    }

    pub fn with_polar(mut self, polar: bool) -> Self {
        self.polar = polar;
        self
    }

    pub fn with_center(mut self, center: CenterMode) -> Self {
        self.center = center;
        self
    }

    pub fn with_resolution(mut self, resolution: GridResolution) -> Self {
        self.grid_resolution = resolution;
        self
    }
}

/// Resolved grid topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridSpec {
    Cartesian { points: usize },
    Polar { radial: usize, backazimuth: usize },
}

/// Station records and parameters that passed every consistency check.
#[derive(Debug, Clone)]
pub struct ValidatedInput {
    records: RecordSet,
    max_slowness_deg: f64,
    grid: GridSpec,
    bands: Vec<FrequencyBand>,
    center: CenterMode,
}

impl ValidatedInput {
    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn max_slowness_deg(&self) -> f64 {
        self.max_slowness_deg
    }

    pub fn max_slowness_km(&self) -> f64 {
        slowness_deg_to_km(self.max_slowness_deg)
    }

    pub fn grid(&self) -> GridSpec {
        self.grid
    }

    pub fn bands(&self) -> &[FrequencyBand] {
        &self.bands
    }

    pub fn center(&self) -> CenterMode {
        self.center
    }

    pub fn is_polar(&self) -> bool {
        matches!(self.grid, GridSpec::Polar { .. })
    }

    pub fn sample_interval(&self) -> f64 {
        self.records.records()[0].sample_interval
    }

    pub fn sample_count(&self) -> usize {
        self.records.records()[0].sample_count
    }

    pub fn start_time(&self) -> f64 {
        self.records.records()[0].start_time
    }

    pub fn end_time(&self) -> f64 {
        self.records.records()[0].end_time()
    }

    pub fn nyquist(&self) -> f64 {
        0.5 / self.sample_interval()
    }
}

/// Checks parameters and records for mutual consistency.
///
/// Configuration errors are reported first, then record errors, then any
/// band at or above the Nyquist frequency.
pub fn validate(records: RecordSet, config: FkConfig) -> FkResult<ValidatedInput> {
    let grid = validate_config(&config)?;
    validate_records(&records)?;

    let nyquist = 0.5 / records.records()[0].sample_interval;
    if let Some(band) = config.frequency_bands.iter().find(|b| b.high >= nyquist) {
        return Err(FkError::NyquistViolation {
            band_high: band.high,
            nyquist,
        });
    }

    Ok(ValidatedInput {
        records,
        max_slowness_deg: config.max_slowness,
        grid,
        bands: config.frequency_bands,
        center: config.center,
    })
}

fn validate_config(config: &FkConfig) -> FkResult<GridSpec> {
    if !config.max_slowness.is_finite() || config.max_slowness <= 0.0 {
        return Err(FkError::Configuration(format!(
            "max slowness must be positive, got {}",
            config.max_slowness
        )));
    }

    let grid = match (config.grid_resolution, config.polar) {
        (GridResolution::Single(points), false) => GridSpec::Cartesian { points },
        (GridResolution::Single(radial), true) => GridSpec::Polar {
            radial,
            backazimuth: DEFAULT_BACKAZIMUTH_POINTS,
        },
        (GridResolution::Pair([radial, backazimuth]), true) => GridSpec::Polar {
            radial,
            backazimuth,
        },
        (GridResolution::Pair(_), false) => {
            return Err(FkError::Configuration(
                "a resolution pair is only valid for polar grids".into(),
            ))
        }
    };
    let too_coarse = match grid {
        GridSpec::Cartesian { points } => points <= 2,
        GridSpec::Polar {
            radial,
            backazimuth,
        } => radial <= 2 || backazimuth <= 2,
    };
    if too_coarse {
        return Err(FkError::Configuration(format!(
            "grid resolution must exceed 2 points per axis, got {:?}",
            config.grid_resolution
        )));
    }

    if config.frequency_bands.is_empty() {
        return Err(FkError::Configuration(
            "at least one frequency band is required".into(),
        ));
    }
    for band in &config.frequency_bands {
        let finite = band.low.is_finite() && band.high.is_finite();
        if !finite || band.low <= 0.0 || band.high <= 0.0 || band.low > band.high {
            return Err(FkError::Configuration(format!(
                "frequency band [{}, {}] must be positive and ordered",
                band.low, band.high
            )));
        }
    }

    if let CenterMode::Explicit {
        latitude,
        longitude,
    } = config.center
    {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(FkError::Configuration(format!(
                "center point [{}, {}] is not a valid latitude/longitude",
                latitude, longitude
            )));
        }
    }

    Ok(grid)
}

fn validate_records(records: &RecordSet) -> FkResult<()> {
    if records.len() < 2 {
        return Err(FkError::InputValidation(format!(
            "at least 2 stations are required, got {}",
            records.len()
        )));
    }

    let first = &records.records()[0];
    if !first.sample_interval.is_finite() || first.sample_interval <= 0.0 {
        return Err(FkError::InputValidation(format!(
            "station {} has a non-positive sample interval",
            first.id
        )));
    }
    if first.sample_count == 0 {
        return Err(FkError::InputValidation(format!(
            "station {} has no samples",
            first.id
        )));
    }

    for record in records.records() {
        if record.samples.len() != record.sample_count {
            return Err(FkError::InputValidation(format!(
                "station {} declares {} samples but carries {}",
                record.id,
                record.sample_count,
                record.samples.len()
            )));
        }
        if record.sample_count != first.sample_count {
            return Err(FkError::InputValidation(format!(
                "station {} has {} samples, expected {}",
                record.id, record.sample_count, first.sample_count
            )));
        }
        if record.sample_interval != first.sample_interval {
            return Err(FkError::InputValidation(format!(
                "station {} sample interval {} differs from {}",
                record.id, record.sample_interval, first.sample_interval
            )));
        }
        if record.start_time != first.start_time {
            return Err(FkError::InputValidation(format!(
                "station {} starts at {} instead of {}",
                record.id, record.start_time, first.start_time
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::geodesy::GeoPoint;
    use crate::records::StationRecord;

    fn records(count: usize, samples: usize, dt: f64) -> RecordSet {
        RecordSet::new(
            (0..count)
                .map(|i| {
                    StationRecord::new(
                        format!("ST{}", i),
                        GeoPoint::new(0.0, i as f64 * 0.1),
                        dt,
                        0.0,
                        vec![0.0; samples],
                    )
                })
                .collect(),
        )
    }

    fn config() -> FkConfig {
        FkConfig::new(10.0, 11, vec![FrequencyBand::new(0.08, 0.12)])
    }

    #[test]
    fn accepts_consistent_input() {
        let input = validate(records(3, 128, 1.0), config()).unwrap();
        assert_eq!(input.grid(), GridSpec::Cartesian { points: 11 });
        assert_eq!(input.center(), CenterMode::Coarray);
        assert_eq!(input.nyquist(), 0.5);
        assert_eq!(input.end_time(), 127.0);
    }

    #[test]
    fn polar_defaults_backazimuth_points() {
        let input = validate(records(2, 64, 1.0), config().with_polar(true)).unwrap();
        assert_eq!(
            input.grid(),
            GridSpec::Polar {
                radial: 11,
                backazimuth: DEFAULT_BACKAZIMUTH_POINTS
            }
        );
    }

    #[test]
    fn rejects_bad_parameters() {
        let bad_slowness = FkConfig {
            max_slowness: 0.0,
            ..config()
        };
        assert!(matches!(
            validate(records(2, 64, 1.0), bad_slowness),
            Err(FkError::Configuration(_))
        ));

        let coarse = config().with_resolution(GridResolution::Single(2));
        assert!(matches!(
            validate(records(2, 64, 1.0), coarse),
            Err(FkError::Configuration(_))
        ));

        let pair_cartesian = config().with_resolution(GridResolution::Pair([10, 90]));
        assert!(matches!(
            validate(records(2, 64, 1.0), pair_cartesian),
            Err(FkError::Configuration(_))
        ));

        let reversed = FkConfig {
            frequency_bands: vec![FrequencyBand::new(0.2, 0.1)],
            ..config()
        };
        assert!(matches!(
            validate(records(2, 64, 1.0), reversed),
            Err(FkError::Configuration(_))
        ));

        let off_globe = config().with_center(CenterMode::Explicit {
            latitude: 95.0,
            longitude: 0.0,
        });
        assert!(matches!(
            validate(records(2, 64, 1.0), off_globe),
            Err(FkError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_inconsistent_records() {
        assert!(matches!(
            validate(records(1, 64, 1.0), config()),
            Err(FkError::InputValidation(_))
        ));

        let mut set = records(3, 64, 1.0).records().to_vec();
        set[2].start_time = 1.0;
        assert!(matches!(
            validate(RecordSet::new(set), config()),
            Err(FkError::InputValidation(_))
        ));

        let mut set = records(3, 64, 1.0).records().to_vec();
        set[1].sample_interval = 0.5;
        assert!(matches!(
            validate(RecordSet::new(set), config()),
            Err(FkError::InputValidation(_))
        ));

        let mut set = records(3, 64, 1.0).records().to_vec();
        set[0].samples.pop();
        assert!(matches!(
            validate(RecordSet::new(set), config()),
            Err(FkError::InputValidation(_))
        ));
    }

    #[test]
    fn any_band_at_nyquist_fails_the_call() {
        let cfg = FkConfig {
            frequency_bands: vec![FrequencyBand::new(0.1, 0.2), FrequencyBand::new(0.3, 0.5)],
            ..config()
        };
        let err = validate(records(2, 64, 1.0), cfg).unwrap_err();
        assert_eq!(
            err,
            FkError::NyquistViolation {
                band_high: 0.5,
                nyquist: 0.5
            }
        );
    }

    #[test]
    fn center_mode_parses_names_and_points() {
        assert_eq!("Coarray".parse::<CenterMode>().unwrap(), CenterMode::Coarray);
        assert_eq!("full".parse::<CenterMode>().unwrap(), CenterMode::Full);
        assert_eq!(
            "12.5, -70".parse::<CenterMode>().unwrap(),
            CenterMode::Explicit {
                latitude: 12.5,
                longitude: -70.0
            }
        );
        assert!("middle".parse::<CenterMode>().is_err());
        assert!(CenterMode::Coarray.uses_real_part());
        assert!(!CenterMode::Full.uses_real_part());
        assert!(CenterMode::Center.is_centered());
    }

    #[test]
    fn config_deserializes_from_json() {
        let cfg: FkConfig = serde_json::from_str(
            r#"{"max_slowness": 15.0, "grid_resolution": [21, 90],
                "frequency_bands": [[0.1, 0.2]], "polar": true, "center": [45.0, 7.5]}"#,
        )
        .unwrap();
        assert_eq!(cfg.grid_resolution, GridResolution::Pair([21, 90]));
        assert_eq!(cfg.frequency_bands[0], FrequencyBand::new(0.1, 0.2));
        assert_eq!(
            cfg.center,
            CenterMode::Explicit {
                latitude: 45.0,
                longitude: 7.5
            }
        );

        let defaults: FkConfig = serde_json::from_str(
            r#"{"max_slowness": 15.0, "grid_resolution": 21, "frequency_bands": [[0.1, 0.2]]}"#,
        )
        .unwrap();
        assert!(!defaults.polar);
        assert_eq!(defaults.center, CenterMode::Coarray);

        let unknown = serde_json::from_str::<FkConfig>(
            r#"{"max_slowness": 15.0, "grid_resolution": 21,
                "frequency_bands": [[0.1, 0.2]], "center": "middle"}"#,
        );
        assert!(unknown.is_err());
    }
}
