pub mod beamform;
pub mod geometry;
pub mod grid;
pub mod output;
pub mod spectral;

pub use beamform::{BandRun, FkEngine};
pub use geometry::{ArrayGeometry, GeometryPair, PairEnd};
pub use grid::SlownessGrid;
pub use output::{BandResult, OutputAssembler, PeakEstimate};
pub use spectral::WhitenedSpectra;

use crate::config::{validate, FkConfig};
use crate::prelude::FkResult;
use crate::records::RecordSet;

/// Validates `records` against `config` and computes every band.
pub fn fk_analysis(records: RecordSet, config: FkConfig) -> FkResult<Vec<BandResult>> {
    let input = validate(records, config)?;
    FkEngine::new().run(input)
}
