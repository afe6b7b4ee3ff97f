use ndarray::{Array2, Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::config::{CenterMode, FrequencyBand, ValidatedInput};
use crate::math::geodesy::{normalize_deg, slowness_km_to_deg};
use crate::prelude::FkWarning;
use crate::processing::grid::SlownessGrid;
use crate::records::StationMetadata;

/// Normalized beam power for one requested frequency band.
///
/// `volume` is indexed `[x, y, frequency]`. For cartesian grids `x`/`y` are
/// east/north slowness in s/km; for polar grids `x` is slowness magnitude in
/// s/km and `y` is backazimuth in degrees. Values are decibels relative to
/// the band peak, so the maximum cell is exactly 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandResult {
    pub band: FrequencyBand,
    pub station_count: usize,
    pub stations: Vec<StationMetadata>,
    pub sample_interval: f64,
    pub sample_count: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub frequencies: Vec<f64>,
    pub volume: Array3<f64>,
    /// Peak decibel value subtracted from the raw volume.
    pub normalization_db: f64,
    pub center: CenterMode,
    pub polar: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<FkWarning>,
}

/// Grid cell holding a power maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakEstimate {
    pub x_index: usize,
    pub y_index: usize,
    pub frequency_index: usize,
    pub frequency_hz: f64,
    pub slowness_km: f64,
    pub slowness_deg: f64,
    pub backazimuth_deg: f64,
    pub power_db: f64,
}

impl BandResult {
    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Power map of one frequency slice.
    pub fn frequency_slice(&self, index: usize) -> Option<ArrayView2<'_, f64>> {
        (index < self.volume.len_of(Axis(2))).then(|| self.volume.index_axis(Axis(2), index))
    }

    /// Strongest cell over the whole volume.
    pub fn peak(&self) -> Option<PeakEstimate> {
        if self.is_empty() {
            return None;
        }
        let mut best: Option<((usize, usize, usize), f64)> = None;
        for (index, &value) in self.volume.indexed_iter() {
            if best.map_or(true, |(_, current)| value > current) {
                best = Some((index, value));
            }
        }
        best.map(|((ix, iy, k), value)| self.estimate(ix, iy, k, value))
    }

    /// Strongest cell of every frequency slice.
    pub fn peak_per_frequency(&self) -> Vec<PeakEstimate> {
        if self.is_empty() {
            return Vec::new();
        }
        self.volume
            .axis_iter(Axis(2))
            .enumerate()
            .filter_map(|(k, slice)| {
                let mut best: Option<((usize, usize), f64)> = None;
                for (index, &value) in slice.indexed_iter() {
                    if best.map_or(true, |(_, current)| value > current) {
                        best = Some((index, value));
                    }
                }
                best.map(|((ix, iy), value)| self.estimate(ix, iy, k, value))
            })
            .collect()
    }

    /// Slowness magnitude (s/km) and backazimuth (degrees) of a grid cell.
    pub fn cell_slowness(&self, x_index: usize, y_index: usize) -> (f64, f64) {
        let (x, y) = (self.x[x_index], self.y[y_index]);
        if self.polar {
            (x, normalize_deg(y))
        } else {
            (x.hypot(y), normalize_deg(x.atan2(y).to_degrees()))
        }
    }

    fn estimate(&self, ix: usize, iy: usize, k: usize, value: f64) -> PeakEstimate {
        let (slowness_km, backazimuth_deg) = self.cell_slowness(ix, iy);
        PeakEstimate {
            x_index: ix,
            y_index: iy,
            frequency_index: k,
            frequency_hz: self.frequencies[k],
            slowness_km,
            slowness_deg: slowness_km_to_deg(slowness_km),
            backazimuth_deg,
            power_db: value,
        }
    }
}

/// Packages per-frequency power maps into normalized band results.
pub struct OutputAssembler {
    stations: Vec<StationMetadata>,
    sample_interval: f64,
    sample_count: usize,
    start_time: f64,
    end_time: f64,
    x: Vec<f64>,
    y: Vec<f64>,
    center: CenterMode,
    polar: bool,
}

impl OutputAssembler {
    pub fn new(input: &ValidatedInput, grid: &SlownessGrid) -> Self {
        Self {
            stations: input.records().metadata(),
            sample_interval: input.sample_interval(),
            sample_count: input.sample_count(),
            start_time: input.start_time(),
            end_time: input.end_time(),
            x: grid.x().to_vec(),
            y: grid.y().to_vec(),
            center: input.center(),
            polar: grid.is_polar(),
        }
    }

    /// Stacks `slices` (one per entry of `frequencies`) and shifts the
    /// volume so its maximum is 0 dB.
    pub fn assemble(
        &self,
        band: FrequencyBand,
        frequencies: Vec<f64>,
        slices: Vec<Array2<f64>>,
    ) -> BandResult {
        let shape = (self.x.len(), self.y.len(), slices.len());
        let mut volume = Array3::zeros(shape);
        for (k, slice) in slices.iter().enumerate() {
            volume.index_axis_mut(Axis(2), k).assign(slice);
        }

        let peak = volume.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let normalization_db = if peak.is_finite() { peak } else { 0.0 };
        volume.mapv_inplace(|value| value - normalization_db);

        self.package(band, frequencies, volume, normalization_db, None)
    }

    /// Zero-filled single slice for a band without frequency bins.
    pub fn empty(&self, band: FrequencyBand) -> BandResult {
        let volume = Array3::zeros((self.x.len(), self.y.len(), 1));
        let warning = FkWarning::EmptyBand {
            low: band.low,
            high: band.high,
        };
        self.package(band, Vec::new(), volume, 0.0, Some(warning))
    }

    fn package(
        &self,
        band: FrequencyBand,
        frequencies: Vec<f64>,
        volume: Array3<f64>,
        normalization_db: f64,
        warning: Option<FkWarning>,
    ) -> BandResult {
        BandResult {
            band,
            station_count: self.stations.len(),
            stations: self.stations.clone(),
            sample_interval: self.sample_interval,
            sample_count: self.sample_count,
            start_time: self.start_time,
            end_time: self.end_time,
            x: self.x.clone(),
            y: self.y.clone(),
            frequencies,
            volume,
            normalization_db,
            center: self.center,
            polar: self.polar,
            warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{validate, FkConfig, GridSpec};
    use crate::math::geodesy::GeoPoint;
    use crate::records::{RecordSet, StationRecord};
    use ndarray::array;

    fn assembler(polar: bool) -> (OutputAssembler, SlownessGrid) {
        let records = RecordSet::new(vec![
            StationRecord::new("A", GeoPoint::new(0.0, 0.0), 1.0, 10.0, vec![0.0; 16]),
            StationRecord::new("B", GeoPoint::new(0.0, 0.1), 1.0, 10.0, vec![0.0; 16]),
        ]);
        let config = FkConfig::new(10.0, 3, vec![FrequencyBand::new(0.1, 0.2)]).with_polar(polar);
        let input = validate(records, config).unwrap();
        let spec = if polar {
            GridSpec::Polar {
                radial: 3,
                backazimuth: 4,
            }
        } else {
            GridSpec::Cartesian { points: 3 }
        };
        let grid = SlownessGrid::new(spec, 0.1);
        (OutputAssembler::new(&input, &grid), grid)
    }

    #[test]
    fn assemble_normalizes_peak_to_zero() {
        let (assembler, _) = assembler(false);
        let slices = vec![
            array![[-3.0, -2.0, -1.0], [0.5, 2.5, -4.0], [1.0, 1.5, 0.0]],
            array![[-3.0, -2.0, -1.0], [0.5, 1.25, -4.0], [1.0, 1.5, 0.0]],
        ];
        let result = assembler.assemble(FrequencyBand::new(0.1, 0.2), vec![0.1, 0.2], slices);
        assert_eq!(result.volume.dim(), (3, 3, 2));
        assert_eq!(result.normalization_db, 2.5);
        assert_eq!(result.volume.iter().copied().fold(f64::NEG_INFINITY, f64::max), 0.0);
        assert_eq!(result.station_count, 2);
        assert_eq!(result.end_time, 25.0);

        let peak = result.peak().unwrap();
        assert_eq!((peak.x_index, peak.y_index, peak.frequency_index), (1, 1, 0));
        assert_eq!(peak.slowness_km, 0.0);
        assert_eq!(result.peak_per_frequency().len(), 2);
        assert!(result.frequency_slice(1).is_some());
        assert!(result.frequency_slice(2).is_none());
    }

    #[test]
    fn empty_band_is_zero_filled_with_warning() {
        let (assembler, grid) = assembler(false);
        let result = assembler.empty(FrequencyBand::new(0.3, 0.31));
        assert!(result.is_empty());
        assert_eq!(result.volume.dim(), (grid.x().len(), grid.y().len(), 1));
        assert!(result.volume.iter().all(|&v| v == 0.0));
        assert_eq!(result.normalization_db, 0.0);
        assert!(matches!(result.warning, Some(FkWarning::EmptyBand { .. })));
        assert!(result.peak().is_none());
    }

    #[test]
    fn cartesian_cell_backazimuth_points_to_source() {
        let (assembler, _) = assembler(false);
        let result = assembler.assemble(
            FrequencyBand::new(0.1, 0.2),
            vec![0.1],
            vec![Array2::zeros((3, 3))],
        );
        // x = +0.1 (east), y = 0
        let (slowness, baz) = result.cell_slowness(2, 1);
        assert!((slowness - 0.1).abs() < 1e-12);
        assert!((baz - 90.0).abs() < 1e-9);
        // x = 0, y = -0.1 (south)
        let (_, baz) = result.cell_slowness(1, 0);
        assert!((baz - 180.0).abs() < 1e-9);
    }

    #[test]
    fn polar_cells_report_axes_directly() {
        let (assembler, _) = assembler(true);
        let result = assembler.assemble(
            FrequencyBand::new(0.1, 0.2),
            vec![0.1],
            vec![Array2::zeros((3, 4))],
        );
        assert!(result.polar);
        let (slowness, baz) = result.cell_slowness(2, 3);
        assert_eq!(slowness, 0.1);
        assert_eq!(baz, 270.0);
    }

    #[test]
    fn band_result_serializes() {
        let (assembler, _) = assembler(false);
        let result = assembler.empty(FrequencyBand::new(0.3, 0.31));
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"center\":\"coarray\""));
        let back: BandResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.volume.dim(), result.volume.dim());
    }
}
