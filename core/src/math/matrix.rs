use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use num_complex::Complex64;

pub struct MatrixHelper;

impl MatrixHelper {
    /// Frequency-independent projection: grid points (G x 2, s/km) against
    /// position vectors (P x 2, km), giving a G x P matrix of seconds.
    pub fn project(grid: ArrayView2<f64>, positions: ArrayView2<f64>) -> Array2<f64> {
        grid.dot(&positions.t())
    }

    /// Builds the steering matrix `exp(2*pi*i*f*D)` for one frequency and
    /// applies it to the cross-spectrum vector.
    pub fn steer(
        projection: ArrayView2<f64>,
        frequency: f64,
        cross_spectrum: ArrayView1<Complex64>,
    ) -> Array1<Complex64> {
        let omega = 2.0 * PI * frequency;
        let steering = projection.mapv(|delay| Complex64::from_polar(1.0, omega * delay));
        steering.dot(&cross_spectrum)
    }
}
