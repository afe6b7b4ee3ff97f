use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::math::geodesy::GeoPoint;
use crate::prelude::{FkError, FkResult};

/// One station's waveform and header values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level.
    #[serde(default)]
    pub elevation: f64,
    /// Sensor burial depth in metres.
    #[serde(default)]
    pub depth: f64,
    /// Seconds between samples.
    pub sample_interval: f64,
    pub sample_count: usize,
    /// Absolute time of the first sample, seconds since the Unix epoch.
    pub start_time: f64,
    pub samples: Vec<f64>,
}

impl StationRecord {
    pub fn new(
        id: impl Into<String>,
        position: GeoPoint,
        sample_interval: f64,
        start_time: f64,
        samples: Vec<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            latitude: position.latitude,
            longitude: position.longitude,
            elevation: 0.0,
            depth: 0.0,
            sample_interval,
            sample_count: samples.len(),
            start_time,
            samples,
        }
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Absolute time of the last sample.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.sample_count.saturating_sub(1) as f64 * self.sample_interval
    }

    pub fn metadata(&self) -> StationMetadata {
        StationMetadata {
            id: self.id.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            elevation: self.elevation,
            depth: self.depth,
        }
    }
}

/// Per-station header values carried into every band result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMetadata {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub depth: f64,
}

/// Collection of station records submitted for one analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<StationRecord>,
}

impl RecordSet {
    pub fn new(records: Vec<StationRecord>) -> Self {
        Self { records }
    }

    pub fn from_json(contents: &str) -> FkResult<Self> {
        serde_json::from_str(contents)
            .map_err(|err| FkError::InputValidation(format!("unreadable record set: {}", err)))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn positions(&self) -> Vec<GeoPoint> {
        self.records.iter().map(StationRecord::position).collect()
    }

    pub fn metadata(&self) -> Vec<StationMetadata> {
        self.records.iter().map(StationRecord::metadata).collect()
    }

    /// Stacks the sample sequences into a stations x samples matrix.
    ///
    /// Fails when the sequences do not share one length.
    pub fn sample_matrix(&self) -> FkResult<Array2<f64>> {
        let columns = self.records.first().map_or(0, |r| r.samples.len());
        let mut flat = Vec::with_capacity(columns * self.records.len());
        for record in &self.records {
            if record.samples.len() != columns {
                return Err(FkError::InputValidation(format!(
                    "station {} has {} samples, expected {}",
                    record.id,
                    record.samples.len(),
                    columns
                )));
            }
            flat.extend_from_slice(&record.samples);
        }
        Array2::from_shape_vec((self.records.len(), columns), flat)
            .map_err(|err| FkError::InputValidation(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, samples: Vec<f64>) -> StationRecord {
        StationRecord::new(id, GeoPoint::new(1.0, 2.0), 0.5, 100.0, samples)
    }

    #[test]
    fn end_time_spans_all_samples() {
        let rec = record("A", vec![0.0; 11]);
        assert_eq!(rec.end_time(), 105.0);
        assert_eq!(rec.sample_count, 11);
    }

    #[test]
    fn sample_matrix_stacks_rows() {
        let set = RecordSet::new(vec![record("A", vec![1.0, 2.0]), record("B", vec![3.0, 4.0])]);
        let matrix = set.sample_matrix().unwrap();
        assert_eq!(matrix.dim(), (2, 2));
        assert_eq!(matrix[[1, 0]], 3.0);
    }

    #[test]
    fn sample_matrix_rejects_ragged_rows() {
        let set = RecordSet::new(vec![record("A", vec![1.0, 2.0]), record("B", vec![3.0])]);
        assert!(matches!(
            set.sample_matrix(),
            Err(FkError::InputValidation(_))
        ));
    }

    #[test]
    fn record_set_reads_json_array() {
        let json = r#"[{"id":"A","latitude":1.0,"longitude":2.0,"sample_interval":1.0,
            "sample_count":2,"start_time":0.0,"samples":[0.0,1.0]}]"#;
        let set = RecordSet::from_json(json).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.records()[0].depth, 0.0);
        assert!(RecordSet::from_json("{").is_err());
    }
}
