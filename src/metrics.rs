//! Evaluation metrics for hard clusterings (inertia, silhouette score).

use crate::primitives::Matrix;

/// Computes the inertia (within-cluster sum of squared distances).
///
/// Lower is better. This is the quantity k-means minimizes.
///
/// # Examples
///
/// ```
/// use mezclar::metrics::inertia;
/// use mezclar::primitives::Matrix;
///
/// let data = Matrix::from_vec(2, 2, vec![0.0, 0.0, 2.0, 0.0]).unwrap();
/// let centroids = Matrix::from_vec(1, 2, vec![1.0, 0.0]).unwrap();
/// let labels = vec![0, 0];
/// assert!((inertia(&data, &centroids, &labels) - 2.0).abs() < 1e-6);
/// ```
///
/// # Panics
///
/// Panics if a label indexes past the centroid rows.
#[must_use]
pub fn inertia(data: &Matrix<f32>, centroids: &Matrix<f32>, labels: &[usize]) -> f32 {
    let mut total = 0.0;

    for (i, &label) in labels.iter().enumerate() {
        let point = data.row(i);
        let centroid = centroids.row(label);
        let diff = &point - &centroid;
        total += diff.norm_squared();
    }

    total
}

/// Computes the silhouette score for clustering quality.
///
/// The silhouette score measures how similar a point is to its own cluster
/// compared to other clusters. Values range from -1 to 1, where higher is
/// better.
///
/// s(i) = (b(i) - a(i)) / max(a(i), b(i))
///
/// where:
/// - a(i) = mean distance to other points in same cluster
/// - b(i) = mean distance to points in nearest other cluster
///
/// Returns 0.0 for degenerate inputs (fewer than 2 samples or fewer than 2
/// clusters); singleton clusters contribute s(i) = 0.
///
/// # Examples
///
/// ```
/// use mezclar::metrics::silhouette_score;
/// use mezclar::primitives::Matrix;
///
/// let data = Matrix::from_vec(4, 2, vec![
///     0.0, 0.0,
///     0.1, 0.1,
///     5.0, 5.0,
///     5.1, 5.1,
/// ]).expect("Matrix dimensions and data length are valid");
/// let labels = vec![0, 0, 1, 1];
/// let score = silhouette_score(&data, &labels);
/// assert!(score > 0.5);
/// ```
#[must_use]
pub fn silhouette_score(data: &Matrix<f32>, labels: &[usize]) -> f32 {
    let n_samples = data.n_rows();

    if n_samples < 2 {
        return 0.0;
    }

    let n_clusters = labels.iter().max().map_or(0, |&m| m + 1);

    if n_clusters < 2 {
        return 0.0;
    }

    let mut counts = vec![0usize; n_clusters];
    for &label in labels {
        counts[label] += 1;
    }

    let mut total = 0.0;
    for i in 0..n_samples {
        total += point_silhouette(data, i, labels, &counts);
    }

    total / n_samples as f32
}

/// Silhouette coefficient for one point: accumulates distances to every
/// cluster in a single pass, then forms a(i) and b(i).
fn point_silhouette(data: &Matrix<f32>, i: usize, labels: &[usize], counts: &[usize]) -> f32 {
    let own = labels[i];
    if counts[own] < 2 {
        // Singleton cluster: silhouette is defined as 0.
        return 0.0;
    }

    let point = data.row(i);
    let mut dist_sums = vec![0.0_f32; counts.len()];
    for (j, &label) in labels.iter().enumerate() {
        if j == i {
            continue;
        }
        let other = data.row(j);
        dist_sums[label] += (&point - &other).norm();
    }

    let a_i = dist_sums[own] / (counts[own] - 1) as f32;
    let b_i = dist_sums
        .iter()
        .enumerate()
        .filter(|&(c, _)| c != own && counts[c] > 0)
        .map(|(c, &sum)| sum / counts[c] as f32)
        .fold(f32::INFINITY, f32::min);

    if b_i.is_infinite() {
        return 0.0;
    }

    let max_ab = a_i.max(b_i);
    if max_ab == 0.0 {
        0.0
    } else {
        (b_i - a_i) / max_ab
    }
}
