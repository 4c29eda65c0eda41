//! DBSCAN: density-based spatial clustering with noise.
//!
//! A point is a *core* point when its epsilon-neighbourhood (itself
//! included) holds at least `min_points` points. Clusters grow
//! breadth-first from core points; non-core points reached during
//! expansion become *border* points, including points that were
//! earlier labelled noise. Neighbourhoods are computed by linear scan.

use super::Cluster;
use std::collections::VecDeque;

/// Transient per-point label during a DBSCAN run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLabel {
    Unvisited,
    /// Not dense enough yet; may still be claimed as a border point
    Noise,
    Cluster(usize),
}

/// DBSCAN parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dbscan {
    epsilon: f64,
    min_points: usize,
}

impl Dbscan {
    /// `min_points` below 1 is raised to 1
    pub fn new(epsilon: f64, min_points: usize) -> Self {
        Self {
            epsilon,
            min_points: min_points.max(1),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn min_points(&self) -> usize {
        self.min_points
    }

    fn region_query<T, F>(&self, points: &[T], idx: usize, distance: &F) -> Vec<usize>
    where
        F: Fn(&T, &T) -> f64,
    {
        (0..points.len())
            .filter(|&j| j == idx || distance(&points[idx], &points[j]) <= self.epsilon)
            .collect()
    }

    /// Label every point. Labels are never `Unvisited` on return.
    pub fn labels<T, F>(&self, points: &[T], distance: F) -> Vec<PointLabel>
    where
        F: Fn(&T, &T) -> f64,
    {
        let mut labels = vec![PointLabel::Unvisited; points.len()];
        let mut next_cluster = 0;

        for i in 0..points.len() {
            if labels[i] != PointLabel::Unvisited {
                continue;
            }

            let neighbours = self.region_query(points, i, &distance);
            if neighbours.len() < self.min_points {
                labels[i] = PointLabel::Noise;
                continue;
            }

            let cluster = next_cluster;
            next_cluster += 1;
            labels[i] = PointLabel::Cluster(cluster);

            let mut queue: VecDeque<usize> = neighbours.into_iter().filter(|&j| j != i).collect();
            while let Some(j) = queue.pop_front() {
                match labels[j] {
                    PointLabel::Noise => labels[j] = PointLabel::Cluster(cluster),
                    PointLabel::Unvisited => {
                        labels[j] = PointLabel::Cluster(cluster);
                        let expansion = self.region_query(points, j, &distance);
                        if expansion.len() >= self.min_points {
                            queue.extend(expansion);
                        }
                    }
                    PointLabel::Cluster(_) => {}
                }
            }
        }

        labels
    }

    /// Cluster `points`, largest clusters first. Noise points are dropped.
    pub fn fit<T, F>(&self, points: &[T], distance: F) -> Vec<Cluster<T>>
    where
        T: Clone,
        F: Fn(&T, &T) -> f64,
    {
        let labels = self.labels(points, distance);

        let mut clusters: Vec<Cluster<T>> = Vec::new();
        for (point, label) in points.iter().zip(&labels) {
            if let PointLabel::Cluster(id) = *label {
                if id >= clusters.len() {
                    clusters.resize_with(id + 1, || Cluster {
                        id: 0,
                        members: Vec::new(),
                    });
                }
                clusters[id].id = id;
                clusters[id].members.push(point.clone());
            }
        }

        // Stable: equal sizes keep discovery order
        clusters.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
        clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn euclidean(a: &(f64, f64), b: &(f64, f64)) -> f64 {
        ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
    }

    #[test]
    fn finds_two_clusters_and_drops_outlier() {
        let points = vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (0.0, 1.0),
            (10.0, 10.0),
            (11.0, 10.0),
            (100.0, 100.0),
        ];

        let clusters = Dbscan::new(1.5, 2).fit(&points, euclidean);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[1].len(), 2);
        assert!(clusters
            .iter()
            .all(|c| !c.members.contains(&(100.0, 100.0))));
    }

    #[test]
    fn noise_is_reclassified_as_border() {
        // Point 0 is visited first and has too few neighbours on its own
        let points = vec![0.0, 1.0, 2.0, 3.0];
        let distance = |a: &f64, b: &f64| (a - b).abs();

        let labels = Dbscan::new(1.0, 3).labels(&points, distance);

        assert_eq!(labels, vec![PointLabel::Cluster(0); 4]);
    }

    #[test]
    fn sparse_points_are_all_noise() {
        let points = vec![0.0, 10.0, 20.0];
        let distance = |a: &f64, b: &f64| (a - b).abs();

        let dbscan = Dbscan::new(1.0, 2);
        assert_eq!(dbscan.labels(&points, distance), vec![PointLabel::Noise; 3]);
        assert!(dbscan.fit(&points, distance).is_empty());
    }

    #[test]
    fn empty_input_returns_no_clusters() {
        let points: Vec<f64> = Vec::new();
        let clusters = Dbscan::new(1.0, 2).fit(&points, |a: &f64, b: &f64| (a - b).abs());
        assert!(clusters.is_empty());
    }

    #[test]
    fn clusters_sorted_by_descending_size() {
        let points = vec![0.0, 0.5, 50.0, 50.5, 51.0, 51.5];
        let clusters = Dbscan::new(0.6, 2).fit(&points, |a: &f64, b: &f64| (a - b).abs());

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members, vec![50.0, 50.5, 51.0, 51.5]);
        assert_eq!(clusters[0].id, 1);
        assert_eq!(clusters[1].members, vec![0.0, 0.5]);
    }

    #[test]
    fn min_points_is_at_least_one() {
        assert_eq!(Dbscan::new(1.0, 0).min_points(), 1);
    }
}
