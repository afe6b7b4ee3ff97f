pub mod station;

pub use station::{RecordSet, StationMetadata, StationRecord};
