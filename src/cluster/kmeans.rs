//! K-Means clustering (Lloyd's algorithm).

use serde::{Deserialize, Serialize};

use crate::error::{MezclarError, Result};
use crate::metrics::inertia;
use crate::primitives::Matrix;
use crate::random;
use crate::traits::UnsupervisedEstimator;

/// K-Means clustering algorithm.
///
/// Uses Lloyd's algorithm. Centroids start as `n_clusters` distinct rows of
/// the data chosen uniformly at random (or explicit seeds via
/// [`KMeans::with_init_centroids`]).
///
/// # Algorithm
///
/// 1. Initialize centroids
/// 2. Assign each sample to its nearest centroid (squared Euclidean
///    distance; ties break to the lowest cluster index), accumulating
///    per-cluster sums and counts in the same pass
/// 3. Update each centroid to the mean of its members; a cluster with no
///    members aborts the fit with [`MezclarError::EmptyCluster`]
/// 4. Stop when the assignment pass changes no label, or when every
///    centroid moved at most `tol`, or after `max_iter` iterations
///
/// # Examples
///
/// ```
/// use mezclar::prelude::*;
///
/// let data = Matrix::from_vec(6, 2, vec![
///     1.0, 2.0,
///     1.5, 1.8,
///     5.0, 8.0,
///     8.0, 8.0,
///     1.0, 0.6,
///     9.0, 11.0,
/// ]).unwrap();
///
/// let mut kmeans = KMeans::new(2).with_random_state(42);
/// kmeans.fit(&data).unwrap();
///
/// let labels = kmeans.predict(&data);
/// assert_eq!(labels.len(), 6);
/// ```
///
/// # Performance
///
/// - Time complexity: O(nkdi) where n=samples, k=clusters, d=features, i=iterations
/// - Space complexity: O(nk)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    /// Number of clusters.
    n_clusters: usize,
    /// Maximum iterations.
    max_iter: usize,
    /// Convergence tolerance on centroid movement.
    tol: f32,
    /// Random seed for initialization.
    random_state: Option<u64>,
    /// Print one progress line per iteration.
    verbose: bool,
    /// Explicit initial centroids (bypasses random seeding).
    init_centroids: Option<Matrix<f32>>,
    /// Cluster centroids after fitting.
    centroids: Option<Matrix<f32>>,
    /// Labels for training data.
    labels: Option<Vec<usize>>,
    /// Sum of squared distances (inertia).
    inertia: f32,
    /// Number of iterations run.
    n_iter: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(8)
    }
}

impl KMeans {
    /// Creates a new K-Means with the specified number of clusters.
    #[must_use]
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            max_iter: 300,
            tol: 1e-4,
            random_state: None,
            verbose: false,
            init_centroids: None,
            centroids: None,
            labels: None,
            inertia: 0.0,
            n_iter: 0,
        }
    }

    /// Sets the maximum number of iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f32) -> Self {
        self.tol = tol;
        self
    }

    /// Sets the random seed for reproducibility.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Enables per-iteration progress output.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets explicit initial centroids (one row per cluster), bypassing
    /// random seeding. Makes the fit fully deterministic.
    #[must_use]
    pub fn with_init_centroids(mut self, centroids: Matrix<f32>) -> Self {
        self.init_centroids = Some(centroids);
        self
    }

    /// Returns the cluster centroids.
    ///
    /// # Panics
    ///
    /// Panics if model is not fitted.
    #[must_use]
    pub fn centroids(&self) -> &Matrix<f32> {
        self.centroids
            .as_ref()
            .expect("Model not fitted. Call fit() first.")
    }

    /// Returns the training labels.
    ///
    /// # Panics
    ///
    /// Panics if model is not fitted.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        self.labels
            .as_ref()
            .expect("Model not fitted. Call fit() first.")
    }

    /// Returns the inertia (within-cluster sum of squares).
    #[must_use]
    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    /// Returns the number of iterations run.
    #[must_use]
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Returns true if the model has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.centroids.is_some()
    }

    /// Picks initial centroids: explicit seeds when given, otherwise
    /// `n_clusters` distinct data rows chosen uniformly at random.
    fn initial_centroids(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let (n_samples, n_features) = x.shape();

        if let Some(seeds) = &self.init_centroids {
            if seeds.shape() != (self.n_clusters, n_features) {
                return Err(MezclarError::DimensionMismatch {
                    expected: format!("{}x{n_features}", self.n_clusters),
                    actual: format!("{}x{}", seeds.n_rows(), seeds.n_cols()),
                });
            }
            return Ok(seeds.clone());
        }

        let mut rng = random::rng_from_seed(self.random_state);
        let rows = random::sample_rows(&mut rng, n_samples, self.n_clusters);
        let mut data = Vec::with_capacity(self.n_clusters * n_features);
        for &row in &rows {
            data.extend_from_slice(x.row_slice(row));
        }
        Ok(Matrix::from_vec(self.n_clusters, n_features, data)
            .expect("Internal error: centroid seeding failed"))
    }

    /// Assigns each sample to its nearest centroid (ties to the lowest
    /// index) while accumulating per-cluster sums and counts.
    fn assign_and_accumulate(
        &self,
        x: &Matrix<f32>,
        centroids: &Matrix<f32>,
    ) -> (Vec<usize>, Vec<f32>, Vec<usize>) {
        let (n_samples, n_features) = x.shape();
        let mut labels = vec![0; n_samples];
        let mut sums = vec![0.0_f32; self.n_clusters * n_features];
        let mut counts = vec![0usize; self.n_clusters];

        for (i, label) in labels.iter_mut().enumerate() {
            let point = x.row_slice(i);
            let mut min_dist = f32::INFINITY;
            let mut min_cluster = 0;

            for k in 0..self.n_clusters {
                let centroid = centroids.row_slice(k);
                let dist: f32 = point
                    .iter()
                    .zip(centroid.iter())
                    .map(|(&p, &c)| (p - c) * (p - c))
                    .sum();

                if dist < min_dist {
                    min_dist = dist;
                    min_cluster = k;
                }
            }

            *label = min_cluster;
            counts[min_cluster] += 1;
            for j in 0..n_features {
                sums[min_cluster * n_features + j] += point[j];
            }
        }

        (labels, sums, counts)
    }

    /// Checks whether every centroid moved at most `tol`.
    fn centroids_converged(&self, old: &Matrix<f32>, new: &Matrix<f32>) -> bool {
        let (n_clusters, n_features) = old.shape();

        for k in 0..n_clusters {
            let mut dist_sq = 0.0;
            for j in 0..n_features {
                let diff = old.get(k, j) - new.get(k, j);
                dist_sq += diff * diff;
            }
            if dist_sq > self.tol * self.tol {
                return false;
            }
        }

        true
    }

    fn validate(&self, x: &Matrix<f32>) -> Result<()> {
        if x.n_rows() == 0 {
            return Err(MezclarError::empty_input("training data"));
        }
        if self.n_clusters == 0 {
            return Err(MezclarError::InvalidHyperparameter {
                param: "n_clusters".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        if self.max_iter == 0 {
            return Err(MezclarError::InvalidHyperparameter {
                param: "max_iter".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        if self.tol <= 0.0 {
            return Err(MezclarError::InvalidHyperparameter {
                param: "tol".to_string(),
                value: format!("{}", self.tol),
                constraint: "> 0".to_string(),
            });
        }
        if x.n_rows() < self.n_clusters {
            return Err(MezclarError::validation(format!(
                "n_samples = {} must be >= n_clusters = {}",
                x.n_rows(),
                self.n_clusters
            )));
        }
        Ok(())
    }
}

impl UnsupervisedEstimator for KMeans {
    type Labels = Vec<usize>;

    /// Fits the K-Means model to data.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Data is empty, or has fewer samples than clusters
    /// - `n_clusters` is 0, `max_iter` is 0, or `tol` is not positive
    /// - Explicit initial centroids have the wrong shape
    /// - A cluster becomes empty during an update
    fn fit(&mut self, x: &Matrix<f32>) -> Result<()> {
        self.validate(x)?;

        let (n_samples, n_features) = x.shape();
        let mut centroids = self.initial_centroids(x)?;

        // Previous assignment state; all-zeros before the first pass.
        let mut labels = vec![0usize; n_samples];
        self.n_iter = 0;

        for iter in 1..=self.max_iter {
            let (new_labels, sums, counts) = self.assign_and_accumulate(x, &centroids);

            if let Some(cluster) = counts.iter().position(|&c| c == 0) {
                return Err(MezclarError::EmptyCluster {
                    cluster,
                    iteration: iter,
                });
            }

            let mut means = sums;
            for k in 0..self.n_clusters {
                for j in 0..n_features {
                    means[k * n_features + j] /= counts[k] as f32;
                }
            }
            let new_centroids = Matrix::from_vec(self.n_clusters, n_features, means)
                .expect("Internal error: centroid update failed");

            let converged =
                new_labels == labels || self.centroids_converged(&centroids, &new_centroids);

            labels = new_labels;
            centroids = new_centroids;
            self.n_iter = iter;

            if self.verbose {
                println!("iter {iter}");
            }

            if converged {
                break;
            }
        }

        self.inertia = inertia(x, &centroids, &labels);
        self.labels = Some(labels);
        self.centroids = Some(centroids);

        Ok(())
    }

    /// Predicts cluster labels for new data.
    ///
    /// # Panics
    ///
    /// Panics if model is not fitted, or if `x` does not have the same
    /// number of features as the training data.
    fn predict(&self, x: &Matrix<f32>) -> Vec<usize> {
        let centroids = self
            .centroids
            .as_ref()
            .expect("Model not fitted. Call fit() first.");
        assert_eq!(x.n_cols(), centroids.n_cols(), "Feature count mismatch");

        let (labels, _, _) = self.assign_and_accumulate(x, centroids);
        labels
    }
}
