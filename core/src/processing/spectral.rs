use ndarray::{Array1, Array2, ArrayView2};
use num_complex::Complex64;
use rustfft::num_traits::Zero;

use crate::math::fft::FftHelper;
use crate::processing::geometry::{GeometryPair, PairEnd};

/// Unit-magnitude spectra of every station on the padded frequency axis.
#[derive(Debug, Clone)]
pub struct WhitenedSpectra {
    frequencies: Vec<f64>,
    /// stations x frequency bins
    spectra: Array2<Complex64>,
}

impl WhitenedSpectra {
    /// Transforms each row of `samples` (stations x samples) and whitens it.
    pub fn compute(samples: ArrayView2<f64>, sample_interval: f64) -> Self {
        let (stations, sample_count) = samples.dim();
        let fft = FftHelper::new(sample_count);
        let frequencies = fft.frequencies(sample_interval);

        let mut spectra = Array2::zeros((stations, fft.positive_bins()));
        for (station, row) in samples.outer_iter().enumerate() {
            let series = row.to_vec();
            for (bin, value) in fft.forward(&series).into_iter().enumerate() {
                spectra[[station, bin]] = whiten(value);
            }
        }

        Self {
            frequencies,
            spectra,
        }
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn station_count(&self) -> usize {
        self.spectra.nrows()
    }

    pub fn spectrum(&self, station: usize, bin: usize) -> Complex64 {
        self.spectra[[station, bin]]
    }

    /// Cross-spectrum vector over `pairs` at one frequency bin.
    ///
    /// A pair `(i, j)` contributes `X_i * conj(X_j)`; the reference point of
    /// the centered modes has unit spectrum, so those pairs contribute `X_i`.
    pub fn cross_spectrum(&self, pairs: &[GeometryPair], bin: usize) -> Array1<Complex64> {
        pairs
            .iter()
            .map(|pair| {
                let near = self.spectra[[pair.from, bin]];
                match pair.to {
                    PairEnd::Station(far) => near * self.spectra[[far, bin]].conj(),
                    PairEnd::Reference => near,
                }
            })
            .collect()
    }
}

// TODO: the 1/(2*pi) amplitude scaling for PSD-calibrated output is not applied;
// add it behind an opt-in flag once a calibrated consumer exists.
/// Scales a spectral value to unit magnitude; exact zeros stay zero.
fn whiten(value: Complex64) -> Complex64 {
    let magnitude = value.norm();
    if magnitude > 0.0 {
        value / magnitude
    } else {
        Complex64::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn pair(from: usize, to: PairEnd) -> GeometryPair {
        GeometryPair {
            from,
            to,
            distance_km: 0.0,
            azimuth_deg: 0.0,
        }
    }

    #[test]
    fn spectra_are_unit_magnitude() {
        let samples = array![[1.0, 2.0, -1.0, 0.5], [0.0, 1.0, 0.0, -1.0]];
        let spectra = WhitenedSpectra::compute(samples.view(), 0.1);
        assert_eq!(spectra.frequencies().len(), 5);
        assert_eq!(spectra.station_count(), 2);
        for bin in 1..4 {
            assert!((spectra.spectrum(0, bin).norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn silent_station_whitens_to_zero() {
        let samples = array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let spectra = WhitenedSpectra::compute(samples.view(), 1.0);
        assert_eq!(spectra.spectrum(0, 1), Complex64::zero());
    }

    #[test]
    fn cross_spectrum_conjugates_far_station() {
        // station 1 is station 0 delayed by one sample
        let samples = array![[0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0]];
        let spectra = WhitenedSpectra::compute(samples.view(), 1.0);
        let pairs = [
            pair(0, PairEnd::Station(1)),
            pair(1, PairEnd::Station(1)),
            pair(1, PairEnd::Reference),
        ];
        // padded length 8, bin 1 is 1/8 Hz; X0 * conj(X1) = exp(+i 2 pi f)
        let cross = spectra.cross_spectrum(&pairs, 1);
        let expected = Complex64::from_polar(1.0, 2.0 * std::f64::consts::PI / 8.0);
        assert!((cross[0] - expected).norm() < 1e-12);
        assert!((cross[1] - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        assert_eq!(cross[2], spectra.spectrum(1, 1));
    }
}
