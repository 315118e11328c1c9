//! # Neighbors Module
//!
//! Exact k-nearest-neighbor search over feature vectors.
//!
//! The index keeps every point and answers a query with a full scan under
//! Euclidean distance. Ordering is total and deterministic: distance
//! ascending, then insertion order.

use crate::FeatureVector;
use std::cmp::Ordering;

/// One neighbor returned by a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the point in the index (insertion order).
    pub index: usize,
    /// Euclidean distance to the query.
    pub distance: f64,
}

/// Exact nearest-neighbor index over four-dimensional points.
#[derive(Debug, Clone, Default)]
pub struct NeighborIndex {
    points: Vec<FeatureVector>,
}

impl NeighborIndex {
    /// Build an index over `points`; positions are preserved.
    #[must_use]
    pub fn new(points: Vec<FeatureVector>) -> Self {
        Self { points }
    }

    /// Number of indexed points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The `k` points closest to `query`, nearest first.
    ///
    /// Returns fewer than `k` when the index is smaller.
    #[must_use]
    pub fn nearest(&self, query: &FeatureVector, k: usize) -> Vec<Neighbor> {
        let mut scored: Vec<(f64, usize)> = self
            .points
            .iter()
            .enumerate()
            .map(|(index, point)| (point.distance_squared(query), index))
            .collect();

        scored.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(d2, index)| Neighbor {
                index,
                distance: d2.sqrt(),
            })
            .collect()
    }
}
