//! Frequency-wavenumber beamforming for seismic arrays.
//!
//! Station records are validated once into a [`config::ValidatedInput`], then
//! the engine reduces the array geometry to pair offsets, projects them onto a
//! slowness grid and evaluates whitened cross-spectra per frequency bin. Each
//! requested band comes back as a [`processing::BandResult`] normalized to a
//! 0 dB peak.

pub mod config;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod records;
pub mod telemetry;

pub use config::{validate, CenterMode, FkConfig, FrequencyBand, GridResolution, ValidatedInput};
pub use prelude::{FkError, FkResult, FkWarning};
pub use processing::{fk_analysis, BandResult, FkEngine, PeakEstimate};
pub use records::{RecordSet, StationRecord};
