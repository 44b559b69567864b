//! Exact k-nearest-neighbor index over the fitted feature matrix.
//!
//! Row `i` of the index corresponds to row `i` of the dataset it was fitted
//! on. Queries scan every row (in parallel) and return neighbors ordered by
//! `(distance, row)`, so equal inputs always produce equal rankings.

use crate::error::{ModelError, ModelResult};
use crate::{Neighbor, NeighborIndex};
use estatex_core::vector::l2_distance;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnParams {
    /// Fitted feature rows, one per dataset row
    pub points: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "KnnParams", into = "KnnParams")]
pub struct KnnIndex {
    points: Vec<Vec<f64>>,
    dim: usize,
}

impl KnnIndex {
    pub fn new(points: Vec<Vec<f64>>) -> ModelResult<Self> {
        let dim = points.first().map(Vec::len).unwrap_or(0);
        if let Some((row, p)) = points.iter().enumerate().find(|(_, p)| p.len() != dim) {
            return Err(ModelError::Invalid(format!(
                "row {} has {} features, expected {}",
                row,
                p.len(),
                dim
            )));
        }
        Ok(Self { points, dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl TryFrom<KnnParams> for KnnIndex {
    type Error = ModelError;

    fn try_from(params: KnnParams) -> ModelResult<Self> {
        Self::new(params.points)
    }
}

impl From<KnnIndex> for KnnParams {
    fn from(index: KnnIndex) -> Self {
        Self {
            points: index.points,
        }
    }
}

impl NeighborIndex for KnnIndex {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn kneighbors(&self, query: &[f64], k: usize) -> ModelResult<Vec<Neighbor>> {
        if k > self.points.len() {
            return Err(ModelError::TooManyNeighbors {
                requested: k,
                available: self.points.len(),
            });
        }
        if query.len() != self.dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(OrderedFloat<f64>, usize)> = self
            .points
            .par_iter()
            .enumerate()
            .map(|(idx, point)| (OrderedFloat(l2_distance(query, point)), idx))
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable(k - 1);
            scored.truncate(k);
        }
        scored.sort_unstable();

        Ok(scored
            .into_iter()
            .map(|(distance, index)| Neighbor {
                index,
                distance: distance.into_inner(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> KnnIndex {
        KnnIndex::new(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![5.0, 5.0],
            vec![0.0, 1.0],
            vec![2.0, 2.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_kneighbors_order_and_ties() {
        let result = index().kneighbors(&[0.0, 0.0], 3).unwrap();
        let order: Vec<usize> = result.iter().map(|n| n.index).collect();
        // rows 1 and 3 are equidistant; lower row index wins
        assert_eq!(order, vec![0, 1, 3]);
        assert_eq!(result[0].distance, 0.0);
        assert!((result[1].distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_kneighbors_all_rows() {
        let result = index().kneighbors(&[5.0, 5.0], 5).unwrap();
        assert_eq!(result.len(), 5);
        assert_eq!(result[0].index, 2);
        assert_eq!(result[4].index, 0);
    }

    #[test]
    fn test_too_many_neighbors() {
        assert!(matches!(
            index().kneighbors(&[0.0, 0.0], 6),
            Err(ModelError::TooManyNeighbors { requested: 6, available: 5 })
        ));
    }

    #[test]
    fn test_query_dimension_checked() {
        assert!(matches!(
            index().kneighbors(&[0.0], 1),
            Err(ModelError::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(KnnIndex::new(vec![vec![0.0, 1.0], vec![1.0]]).is_err());
    }

    #[test]
    fn test_repeat_queries_are_identical() {
        let idx = index();
        let a = idx.kneighbors(&[1.5, 1.0], 4).unwrap();
        let b = idx.kneighbors(&[1.5, 1.0], 4).unwrap();
        assert_eq!(a, b);
    }
}
