use ndarray::{Array1, Array2};

use crate::config::GridSpec;

/// Search grid of horizontal slowness vectors.
///
/// Cartesian grids span `[-smax, smax]` on both axes (east, north, s/km).
/// Polar grids use slowness magnitude `[0, smax]` (s/km) on the first axis and
/// backazimuth `[0, 360)` degrees on the second. Point `(i, j)` is stored at
/// row `i * y.len() + j` of [`SlownessGrid::points`].
#[derive(Debug, Clone)]
pub struct SlownessGrid {
    spec: GridSpec,
    x: Vec<f64>,
    y: Vec<f64>,
    points: Array2<f64>,
}

impl SlownessGrid {
    pub fn new(spec: GridSpec, max_slowness_km: f64) -> Self {
        let (x, y) = match spec {
            GridSpec::Cartesian { points } => {
                let axis = Array1::linspace(-max_slowness_km, max_slowness_km, points).to_vec();
                (axis.clone(), axis)
            }
            GridSpec::Polar {
                radial,
                backazimuth,
            } => {
                let step = 360.0 / backazimuth as f64;
                (
                    Array1::linspace(0.0, max_slowness_km, radial).to_vec(),
                    Array1::from_shape_fn(backazimuth, |j| j as f64 * step).to_vec(),
                )
            }
        };

        let mut points = Array2::zeros((x.len() * y.len(), 2));
        for (i, &xi) in x.iter().enumerate() {
            for (j, &yj) in y.iter().enumerate() {
                let row = i * y.len() + j;
                let (east, north) = match spec {
                    GridSpec::Cartesian { .. } => (xi, yj),
                    GridSpec::Polar { .. } => {
                        let baz = yj.to_radians();
                        (xi * baz.sin(), xi * baz.cos())
                    }
                };
                points[[row, 0]] = east;
                points[[row, 1]] = north;
            }
        }

        Self { spec, x, y, points }
    }

    pub fn spec(&self) -> GridSpec {
        self.spec
    }

    pub fn is_polar(&self) -> bool {
        matches!(self.spec, GridSpec::Polar { .. })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.x.len(), self.y.len())
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// Grid points as a G x 2 (east, north) matrix in s/km.
    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartesian_grid_is_square_and_symmetric() {
        for points in [3, 4, 11, 40] {
            let grid = SlownessGrid::new(GridSpec::Cartesian { points }, 0.2);
            assert_eq!(grid.len(), points * points);
            assert_eq!(grid.x().first().copied(), Some(-0.2));
            assert_eq!(grid.x().last().copied(), Some(0.2));
            assert_eq!(grid.x(), grid.y());
            for i in 0..points {
                assert!((grid.x()[i] + grid.x()[points - 1 - i]).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn odd_cartesian_grid_contains_origin() {
        let grid = SlownessGrid::new(GridSpec::Cartesian { points: 21 }, 0.1);
        assert_eq!(grid.x()[10], 0.0);
        let row = 10 * 21 + 10;
        assert_eq!(grid.points()[[row, 0]], 0.0);
        assert_eq!(grid.points()[[row, 1]], 0.0);
    }

    #[test]
    fn polar_grid_spans_magnitude_and_backazimuth() {
        let grid = SlownessGrid::new(
            GridSpec::Polar {
                radial: 5,
                backazimuth: 181,
            },
            0.1,
        );
        assert_eq!(grid.shape(), (5, 181));
        assert_eq!(grid.x()[0], 0.0);
        assert_eq!(grid.x()[4], 0.1);
        assert!(grid.y().iter().all(|baz| (0.0..360.0).contains(baz)));
        assert_eq!(grid.y()[0], 0.0);
        assert!(grid.is_polar());
    }

    #[test]
    fn polar_points_point_toward_backazimuth() {
        let grid = SlownessGrid::new(
            GridSpec::Polar {
                radial: 3,
                backazimuth: 4,
            },
            0.2,
        );
        // magnitude 0.2, backazimuth 90 degrees
        let row = 2 * 4 + 1;
        assert!((grid.points()[[row, 0]] - 0.2).abs() < 1e-12);
        assert!(grid.points()[[row, 1]].abs() < 1e-12);
        // magnitude zero collapses onto the origin
        assert!(grid.points()[[3, 0]].abs() < 1e-15);
    }

    #[test]
    fn axes_are_evenly_spaced_between_end_points() {
        for points in [3, 21, 41, 81] {
            let grid = SlownessGrid::new(GridSpec::Cartesian { points }, 0.0899);
            let step = 2.0 * 0.0899 / (points - 1) as f64;
            assert_eq!(grid.x().last().copied(), Some(0.0899));
            assert_eq!(grid.x()[points / 2], 0.0);
            for pair in grid.x().windows(2) {
                assert!((pair[1] - pair[0] - step).abs() < 1e-15);
            }
        }
    }
}
