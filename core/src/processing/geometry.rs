use ndarray::Array2;

use crate::config::CenterMode;
use crate::math::geodesy::{centroid, GeoPoint, InverseGeodesic};
use crate::prelude::{FkError, FkResult};

/// Far end of a pair: another station or the reference point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairEnd {
    Station(usize),
    Reference,
}

/// Distance and azimuth from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryPair {
    pub from: usize,
    pub to: PairEnd,
    pub distance_km: f64,
    /// Degrees in [0, 360).
    pub azimuth_deg: f64,
}

impl GeometryPair {
    /// East/north offset in km of the far end relative to `from`.
    pub fn position(&self) -> [f64; 2] {
        let azimuth = self.azimuth_deg.to_radians();
        [
            self.distance_km * azimuth.sin(),
            self.distance_km * azimuth.cos(),
        ]
    }

    pub fn is_self_pair(&self) -> bool {
        self.to == PairEnd::Station(self.from)
    }
}

/// Retained pairs for one centering strategy.
#[derive(Debug, Clone)]
pub struct ArrayGeometry {
    pairs: Vec<GeometryPair>,
    reference: Option<GeoPoint>,
}

impl ArrayGeometry {
    /// Computes the pairs for `mode` over `stations`.
    ///
    /// Coarray keeps `(i, j)` for `i < j`, full keeps every ordered `(i, j)`
    /// and the centered modes pair each station with the reference point.
    pub fn build<G: InverseGeodesic>(
        stations: &[GeoPoint],
        mode: CenterMode,
        geodesic: &G,
    ) -> FkResult<Self> {
        let n = stations.len();
        let pair = |from: usize, to: PairEnd, target: GeoPoint| {
            let inverse = geodesic.inverse(stations[from], target);
            GeometryPair {
                from,
                to,
                distance_km: inverse.distance_km,
                azimuth_deg: inverse.azimuth_deg,
            }
        };

        let (pairs, reference) = match mode {
            CenterMode::Coarray => {
                let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
                for i in 0..n {
                    for j in (i + 1)..n {
                        pairs.push(pair(i, PairEnd::Station(j), stations[j]));
                    }
                }
                (pairs, None)
            }
            CenterMode::Full => {
                let mut pairs = Vec::with_capacity(n * n);
                for i in 0..n {
                    for j in 0..n {
                        pairs.push(pair(i, PairEnd::Station(j), stations[j]));
                    }
                }
                (pairs, None)
            }
            CenterMode::Center => {
                let reference = centroid(stations).ok_or_else(|| {
                    FkError::InputValidation("station positions have no centroid".into())
                })?;
                let pairs = (0..n)
                    .map(|i| pair(i, PairEnd::Reference, reference))
                    .collect();
                (pairs, Some(reference))
            }
            CenterMode::Explicit {
                latitude,
                longitude,
            } => {
                let reference = GeoPoint::new(latitude, longitude);
                let pairs = (0..n)
                    .map(|i| pair(i, PairEnd::Reference, reference))
                    .collect();
                (pairs, Some(reference))
            }
        };

        Ok(Self { pairs, reference })
    }

    pub fn pairs(&self) -> &[GeometryPair] {
        &self.pairs
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    pub fn reference(&self) -> Option<GeoPoint> {
        self.reference
    }

    /// Position vectors as a pairs x 2 (east, north) matrix in km.
    pub fn positions(&self) -> Array2<f64> {
        let mut positions = Array2::zeros((self.pairs.len(), 2));
        for (row, pair) in self.pairs.iter().enumerate() {
            let [east, north] = pair.position();
            positions[[row, 0]] = east;
            positions[[row, 1]] = north;
        }
        positions
    }
}
