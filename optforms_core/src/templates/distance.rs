//! Points in the plane and the pairwise distances between them
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::templates::{check_non_negative, TemplateError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Distance for every ordered pair of points
///
/// The diagonal is never read, it is kept at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    distances: DMatrix<f64>,
}

impl DistanceMatrix {
    /// Euclidean distances between coordinates, symmetric by construction
    pub fn from_points(points: &[Point]) -> Result<Self, TemplateError> {
        for (i, point) in points.iter().enumerate() {
            if !point.x.is_finite() || !point.y.is_finite() {
                return Err(TemplateError::Domain {
                    field: format!("coordinates of point {}", i),
                    value: if point.x.is_finite() { point.y } else { point.x },
                    reason: "must be a finite number",
                });
            }
        }
        let n = points.len();
        Ok(DistanceMatrix {
            distances: DMatrix::from_fn(n, n, |i, j| {
                if i == j {
                    0.
                } else {
                    points[i].distance(&points[j])
                }
            }),
        })
    }

    /// Distances given row by row, `rows[i][j]` being the cost of going from `i` to `j`
    pub fn from_explicit(rows: &[Vec<f64>]) -> Result<Self, TemplateError> {
        let n = rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(TemplateError::Dimension(format!(
                    "distance row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            for (j, &value) in row.iter().enumerate() {
                if i != j {
                    check_non_negative(&format!("distance ({}, {})", i, j), value)?;
                }
            }
        }
        Ok(DistanceMatrix {
            distances: DMatrix::from_fn(n, n, |i, j| if i == j { 0. } else { rows[i][j] }),
        })
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.distances[(from, to)]
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.distances.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let n = self.len();
        (0..n).all(|i| (i + 1..n).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tolerance))
    }

    /// Row by row copy, the shape [`from_explicit`](Self::from_explicit) reads
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.distances
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

impl Serialize for DistanceMatrix {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_rows().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DistanceMatrix {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<Vec<f64>>::deserialize(deserializer)?;
        DistanceMatrix::from_explicit(&rows).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean() {
        let points = [Point::new(0., 0.), Point::new(3., 4.), Point::new(0., 1.)];
        let matrix = DistanceMatrix::from_points(&points).unwrap();
        assert_eq!(matrix.len(), 3);
        assert!((matrix.get(0, 1) - 5.).abs() < 1e-12);
        assert!((matrix.get(2, 0) - 1.).abs() < 1e-12);
        assert_eq!(matrix.get(1, 1), 0.);
        assert!(matrix.is_symmetric(1e-12));
    }

    #[test]
    fn explicit_distances() {
        let matrix =
            DistanceMatrix::from_explicit(&[vec![9., 2.], vec![3., 9.]]).unwrap();
        assert_eq!(matrix.get(0, 1), 2.);
        assert_eq!(matrix.get(1, 0), 3.);
        // diagonal is ignored
        assert_eq!(matrix.get(0, 0), 0.);
        assert!(!matrix.is_symmetric(1e-9));
    }

    #[test]
    fn explicit_distances_are_validated() {
        assert!(matches!(
            DistanceMatrix::from_explicit(&[vec![0., -1.], vec![1., 0.]]),
            Err(TemplateError::Domain { .. })
        ));
        assert!(matches!(
            DistanceMatrix::from_explicit(&[vec![0., 1.], vec![1.]]),
            Err(TemplateError::Dimension(_))
        ));
        assert!(DistanceMatrix::from_explicit(&[vec![0., f64::NAN], vec![1., 0.]]).is_err());
        assert!(DistanceMatrix::from_points(&[Point::new(f64::INFINITY, 0.)]).is_err());
    }

    #[test]
    fn deserialize_rows() {
        let matrix: DistanceMatrix = serde_json::from_str("[[0, 4], [4, 0]]").unwrap();
        assert_eq!(matrix.get(1, 0), 4.);
        assert!(serde_json::from_str::<DistanceMatrix>("[[0, -4], [4, 0]]").is_err());
        assert_eq!(serde_json::to_string(&matrix).unwrap(), "[[0.0,4.0],[4.0,0.0]]");
    }
}
