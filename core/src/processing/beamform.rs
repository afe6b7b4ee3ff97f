//! Frequency-wavenumber beamforming engine.
//!
//! The geometry/grid projection is computed once per run; each frequency bin
//! then only scales it, takes the complex exponential and multiplies by that
//! bin's cross-spectrum vector. Bins are independent, so the per-band map can
//! run serially or (with the `parallel` feature) on the rayon pool with
//! identical results.

use ndarray::Array2;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{CenterMode, FrequencyBand, ValidatedInput};
use crate::math::geodesy::{InverseGeodesic, SphericalEarth};
use crate::math::matrix::MatrixHelper;
use crate::prelude::FkResult;
use crate::processing::geometry::ArrayGeometry;
use crate::processing::grid::SlownessGrid;
use crate::processing::output::{BandResult, OutputAssembler};
use crate::processing::spectral::WhitenedSpectra;
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};

/// Runs FK analyses over validated inputs.
pub struct FkEngine<G = SphericalEarth> {
    geodesic: G,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl FkEngine<SphericalEarth> {
    pub fn new() -> Self {
        Self::with_geodesic(SphericalEarth)
    }
}

impl Default for FkEngine<SphericalEarth> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: InverseGeodesic + Sync> FkEngine<G> {
    pub fn with_geodesic(geodesic: G) -> Self {
        Self {
            geodesic,
            logger: LogManager::new("beamform"),
            metrics: MetricsRecorder::new(),
        }
    }

    /// Computes every requested band.
    pub fn run(&self, input: ValidatedInput) -> FkResult<Vec<BandResult>> {
        Ok(self.bands(input)?.collect())
    }

    /// Prepares geometry, grid and spectra, then yields one band per step.
    ///
    /// Dropping the iterator between bands abandons the remaining work.
    pub fn bands(&self, input: ValidatedInput) -> FkResult<BandRun<'_, G>> {
        let geometry =
            ArrayGeometry::build(&input.records().positions(), input.center(), &self.geodesic)?;
        let grid = SlownessGrid::new(input.grid(), input.max_slowness_km());
        let projection = MatrixHelper::project(grid.points().view(), geometry.positions().view());
        let samples = input.records().sample_matrix()?;
        let spectra = WhitenedSpectra::compute(samples.view(), input.sample_interval());
        let assembler = OutputAssembler::new(&input, &grid);

        self.logger.record(&format!(
            "{} stations, {} pairs ({}), {} grid points, {} bands",
            input.records().len(),
            geometry.pair_count(),
            input.center(),
            grid.len(),
            input.bands().len()
        ));

        Ok(BandRun {
            engine: self,
            input,
            geometry,
            grid,
            projection,
            spectra,
            assembler,
            next_band: 0,
        })
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Lazily evaluated bands of one analysis.
pub struct BandRun<'a, G> {
    engine: &'a FkEngine<G>,
    input: ValidatedInput,
    geometry: ArrayGeometry,
    grid: SlownessGrid,
    /// grid points x pairs, seconds
    projection: Array2<f64>,
    spectra: WhitenedSpectra,
    assembler: OutputAssembler,
    next_band: usize,
}

impl<G: InverseGeodesic + Sync> BandRun<'_, G> {
    pub fn geometry(&self) -> &ArrayGeometry {
        &self.geometry
    }

    pub fn grid(&self) -> &SlownessGrid {
        &self.grid
    }

    fn compute_band(&self, band: FrequencyBand) -> BandResult {
        let engine = self.engine;
        let bins: Vec<usize> = self
            .spectra
            .frequencies()
            .iter()
            .enumerate()
            .filter(|(_, frequency)| band.contains(**frequency))
            .map(|(bin, _)| bin)
            .collect();

        if bins.is_empty() {
            engine.logger.warn(&format!(
                "no frequency bins in band [{}, {}] Hz; volume zero-filled",
                band.low, band.high
            ));
            engine.metrics.record_empty_band();
            return self.assembler.empty(band);
        }

        let frequencies: Vec<f64> = bins
            .iter()
            .map(|&bin| self.spectra.frequencies()[bin])
            .collect();

        #[cfg(feature = "parallel")]
        let slices: Vec<Array2<f64>> = bins.par_iter().map(|&bin| self.beam_power(bin)).collect();
        #[cfg(not(feature = "parallel"))]
        let slices: Vec<Array2<f64>> = bins.iter().map(|&bin| self.beam_power(bin)).collect();

        engine.metrics.record_bins(bins.len());
        engine.metrics.record_band();

        let result = self.assembler.assemble(band, frequencies, slices);
        engine.logger.record(&format!(
            "band [{}, {}] Hz: {} bins, peak {:.3} dB",
            band.low,
            band.high,
            result.frequencies.len(),
            result.normalization_db
        ));
        result
    }

    /// Beam power in dB on the (x, y) grid for one frequency bin.
    fn beam_power(&self, bin: usize) -> Array2<f64> {
        let frequency = self.spectra.frequencies()[bin];
        let cross = self.spectra.cross_spectrum(self.geometry.pairs(), bin);
        let response = MatrixHelper::steer(self.projection.view(), frequency, cross.view());

        let mode = self.input.center();
        let pair_count = self.geometry.pair_count() as f64;
        let (nx, ny) = self.grid.shape();
        self.engine
            .logger
            .detail(&format!("bin {} ({:.5} Hz)", bin, frequency));

        Array2::from_shape_fn((nx, ny), |(i, j)| {
            power_db(response[i * ny + j], mode, pair_count)
        })
    }
}

impl<G: InverseGeodesic + Sync> Iterator for BandRun<'_, G> {
    type Item = BandResult;

    fn next(&mut self) -> Option<Self::Item> {
        let band = *self.input.bands().get(self.next_band)?;
        self.next_band += 1;
        Some(self.compute_band(band))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.input.bands().len() - self.next_band;
        (remaining, Some(remaining))
    }
}

/// Coarray keeps the real part of the summed response; the other modes use
/// its squared magnitude. Both are averaged over the pair count.
///
/// `full` takes the squared magnitude as well: a coherent two-station arrival
/// (four pairs, two of them self-pairs) normalizes to `10 log10(4)`.
fn power_db(response: num_complex::Complex64, mode: CenterMode, pair_count: f64) -> f64 {
    let power = if mode.uses_real_part() {
        response.re.abs()
    } else {
        response.norm_sqr()
    };
    10.0 * (power / pair_count).max(f64::MIN_POSITIVE).log10()
}
