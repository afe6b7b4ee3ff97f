pub mod fft;
pub mod geodesy;
pub mod matrix;

pub use fft::FftHelper;
pub use geodesy::{GeoPoint, InverseGeodesic, SphericalEarth};
pub use matrix::MatrixHelper;
