//! Agglomerative hierarchical clustering.
//!
//! Starts from singletons and repeatedly merges the globally closest
//! pair of clusters while their linkage distance is within the
//! threshold. The cluster distance matrix is rebuilt after every merge,
//! which is O(n^3) overall and intended for groups of hundreds of items.

use super::Cluster;
use serde::{Deserialize, Serialize};

/// Inter-cluster distance rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Linkage {
    /// Closest pair of members
    Single,
    /// Farthest pair of members
    Complete,
    /// Mean over all member pairs
    Average,
}

/// Hierarchical clustering parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HierarchicalClustering {
    linkage: Linkage,
    threshold: f64,
}

impl HierarchicalClustering {
    pub fn new(linkage: Linkage, threshold: f64) -> Self {
        Self { linkage, threshold }
    }

    fn linkage_distance(&self, a: &[usize], b: &[usize], point_distances: &[Vec<f64>]) -> f64 {
        let pairs = a
            .iter()
            .flat_map(|&i| b.iter().map(move |&j| point_distances[i][j]));
        match self.linkage {
            Linkage::Single => pairs.fold(f64::INFINITY, f64::min),
            Linkage::Complete => pairs.fold(f64::NEG_INFINITY, f64::max),
            Linkage::Average => {
                let count = (a.len() * b.len()) as f64;
                pairs.sum::<f64>() / count
            }
        }
    }

    /// Cluster `points`. Singleton clusters are dropped from the result.
    pub fn fit<T, F>(&self, points: &[T], distance: F) -> Vec<Cluster<T>>
    where
        T: Clone,
        F: Fn(&T, &T) -> f64,
    {
        let n = points.len();

        // NaN would poison every comparison; treat it as "infinitely far"
        let mut point_distances = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = distance(&points[i], &points[j]);
                let d = if d.is_nan() { f64::INFINITY } else { d };
                point_distances[i][j] = d;
                point_distances[j][i] = d;
            }
        }

        let mut clusters: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

        while clusters.len() >= 2 {
            let k = clusters.len();
            let mut matrix = vec![vec![f64::INFINITY; k]; k];
            for i in 0..k {
                for j in (i + 1)..k {
                    matrix[i][j] =
                        self.linkage_distance(&clusters[i], &clusters[j], &point_distances);
                }
            }

            let mut best: Option<(usize, usize, f64)> = None;
            for (i, row) in matrix.iter().enumerate() {
                for (j, &d) in row.iter().enumerate().skip(i + 1) {
                    if best.map_or(true, |(_, _, best_d)| d < best_d) {
                        best = Some((i, j, d));
                    }
                }
            }

            match best {
                Some((i, j, d)) if d <= self.threshold => {
                    let absorbed = clusters.remove(j);
                    clusters[i].extend(absorbed);
                    clusters[i].sort_unstable();
                }
                _ => break,
            }
        }

        clusters
            .into_iter()
            .filter(|members| members.len() >= 2)
            .enumerate()
            .map(|(id, members)| Cluster {
                id,
                members: members.into_iter().map(|i| points[i].clone()).collect(),
            })
            .collect()
    }
}
