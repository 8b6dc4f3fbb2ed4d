// =========================================================================
// FALSIFY-KM: K-Means (Lloyd) contract
//
// References:
//   - Lloyd (1982) "Least Squares Quantization in PCM"
//   - MacQueen (1967) "Some Methods for Classification and Analysis of
//     Multivariate Observations"
// =========================================================================

use super::*;
use crate::error::MezclarError;
use crate::metrics::inertia;
use crate::primitives::Matrix;
use crate::random;
use crate::traits::UnsupervisedEstimator;

fn two_blob_data() -> Matrix<f32> {
    Matrix::from_vec(
        6,
        2,
        vec![1.0, 2.0, 1.5, 1.8, 1.0, 0.6, 5.0, 8.0, 8.0, 8.0, 9.0, 11.0],
    )
    .expect("valid matrix")
}

/// 100 points, 50 from a unit-variance Gaussian at (0, 0) and 50 from one
/// at (10, 10).
fn two_gaussian_data() -> Matrix<f32> {
    let mut rng = random::rng_from_seed(Some(17));
    let mut data = Vec::with_capacity(200);
    for i in 0..100 {
        let center = if i < 50 { 0.0 } else { 10.0 };
        data.push(center + random::standard_normal(&mut rng));
        data.push(center + random::standard_normal(&mut rng));
    }
    Matrix::from_vec(100, 2, data).expect("valid matrix")
}

/// FALSIFY-KM-001: Valid cluster indices — all labels in [0, K-1]
#[test]
fn falsify_km_001_valid_indices() {
    let data = two_blob_data();
    let k = 2;
    let mut km = KMeans::new(k).with_random_state(42);
    km.fit(&data).expect("fit succeeds");

    let labels = km.predict(&data);
    for (i, &label) in labels.iter().enumerate() {
        assert!(
            label < k,
            "FALSIFIED KM-001: label[{i}] = {label}, expected < {k}"
        );
    }
}

/// FALSIFY-KM-002: Objective non-negative, and stored inertia matches a
/// recomputation from the fitted centroids and labels
#[test]
fn falsify_km_002_inertia_consistent() {
    let data = two_blob_data();
    let mut km = KMeans::new(2).with_random_state(42);
    km.fit(&data).expect("fit succeeds");

    assert!(
        km.inertia() >= 0.0,
        "FALSIFIED KM-002: inertia = {} < 0",
        km.inertia()
    );

    let recomputed = inertia(&data, km.centroids(), km.labels());
    assert!(
        (km.inertia() - recomputed).abs() < 1e-4,
        "FALSIFIED KM-002: stored inertia {} != recomputed {recomputed}",
        km.inertia()
    );
}

/// FALSIFY-KM-003: Nearest centroid assignment — each point assigned to closest
#[test]
fn falsify_km_003_nearest_centroid() {
    let data = Matrix::from_vec(
        6,
        2,
        vec![
            0.0, 0.0, 0.1, 0.1, 0.2, 0.2, 10.0, 10.0, 10.1, 10.1, 10.2, 10.2,
        ],
    )
    .expect("valid matrix");

    let mut km = KMeans::new(2).with_random_state(42);
    km.fit(&data).expect("fit succeeds");

    let labels = km.predict(&data);
    let centroids = km.centroids();
    let n_features = 2;

    for i in 0..6 {
        let assigned = labels[i];
        let d_assigned: f32 = (0..n_features)
            .map(|f| {
                let diff = data.get(i, f) - centroids.get(assigned, f);
                diff * diff
            })
            .sum();

        for c in 0..2 {
            if c == assigned {
                continue;
            }
            let d_other: f32 = (0..n_features)
                .map(|f| {
                    let diff = data.get(i, f) - centroids.get(c, f);
                    diff * diff
                })
                .sum();
            assert!(
                d_assigned <= d_other + 1e-5,
                "FALSIFIED KM-003: point[{i}] assigned to c={assigned} (d={d_assigned}) but c={c} is closer (d={d_other})"
            );
        }
    }
}

/// FALSIFY-KM-004: Each centroid is the mean of its assigned points
#[test]
fn falsify_km_004_centroid_is_member_mean() {
    let data = two_blob_data();
    let mut km = KMeans::new(2).with_random_state(42);
    km.fit(&data).expect("fit succeeds");

    let labels = km.labels();
    let centroids = km.centroids();

    for k in 0..2 {
        let members: Vec<usize> = (0..6).filter(|&i| labels[i] == k).collect();
        assert!(!members.is_empty(), "FALSIFIED KM-004: cluster {k} empty");

        for j in 0..2 {
            let mean: f32 =
                members.iter().map(|&i| data.get(i, j)).sum::<f32>() / members.len() as f32;
            assert!(
                (centroids.get(k, j) - mean).abs() < 1e-4,
                "FALSIFIED KM-004: centroid[{k}][{j}] = {}, member mean = {mean}",
                centroids.get(k, j)
            );
        }
    }
}

/// FALSIFY-KM-005: Equidistant point resolves to the lowest cluster index
#[test]
fn falsify_km_005_tie_breaks_low() {
    let data = Matrix::from_vec(4, 1, vec![0.0, 0.0, 4.0, 4.0]).expect("valid matrix");
    let init = Matrix::from_vec(2, 1, vec![0.0, 4.0]).expect("valid matrix");
    let mut km = KMeans::new(2).with_init_centroids(init);
    km.fit(&data).expect("fit succeeds");

    let mid = Matrix::from_vec(1, 1, vec![2.0]).expect("valid matrix");
    let labels = km.predict(&mid);
    assert_eq!(
        labels[0], 0,
        "FALSIFIED KM-005: equidistant point got cluster {}, expected 0",
        labels[0]
    );
}

/// FALSIFY-KM-006: Empty cluster is detected and reported with its index
#[test]
fn falsify_km_006_empty_cluster_detected() {
    let data = Matrix::from_vec(4, 1, vec![0.0, 1.0, 2.0, 3.0]).expect("valid matrix");
    let init = Matrix::from_vec(2, 1, vec![1.5, 1000.0]).expect("valid matrix");
    let mut km = KMeans::new(2).with_init_centroids(init);

    match km.fit(&data) {
        Err(MezclarError::EmptyCluster { cluster, iteration }) => {
            assert_eq!(cluster, 1, "FALSIFIED KM-006: wrong cluster index");
            assert_eq!(iteration, 1, "FALSIFIED KM-006: wrong iteration");
        }
        other => panic!("FALSIFIED KM-006: expected EmptyCluster, got {other:?}"),
    }
}

/// FALSIFY-KM-007: Two fits with the same seed produce identical models
#[test]
fn falsify_km_007_seeded_determinism() {
    let data = two_blob_data();

    let mut a = KMeans::new(2).with_random_state(99);
    let mut b = KMeans::new(2).with_random_state(99);
    a.fit(&data).expect("fit succeeds");
    b.fit(&data).expect("fit succeeds");

    assert_eq!(a.labels(), b.labels(), "FALSIFIED KM-007: labels differ");
    assert_eq!(
        a.centroids(),
        b.centroids(),
        "FALSIFIED KM-007: centroids differ"
    );
    assert_eq!(a.n_iter(), b.n_iter(), "FALSIFIED KM-007: n_iter differs");
}

/// FALSIFY-KM-008: K=1 converges in a single pass with the global mean
#[test]
fn falsify_km_008_single_cluster_one_pass() {
    let data = Matrix::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("valid matrix");

    let mut km = KMeans::new(1).with_random_state(42);
    km.fit(&data).expect("fit succeeds");

    assert_eq!(
        km.n_iter(),
        1,
        "FALSIFIED KM-008: K=1 took {} iterations",
        km.n_iter()
    );
    assert!(
        (km.centroids().get(0, 0) - 3.0).abs() < 1e-4,
        "FALSIFIED KM-008: centroid[0][0] = {}, expected 3.0",
        km.centroids().get(0, 0)
    );
    assert!(
        (km.centroids().get(0, 1) - 4.0).abs() < 1e-4,
        "FALSIFIED KM-008: centroid[0][1] = {}, expected 4.0",
        km.centroids().get(0, 1)
    );
}

/// FALSIFY-KM-009: Two well-separated Gaussians are recovered — centroids
/// within 0.5 of the true centers, every sample grouped with its own blob
#[test]
fn falsify_km_009_two_gaussian_recovery() {
    let data = two_gaussian_data();
    let init = Matrix::from_vec(2, 2, vec![0.0, 0.0, 10.0, 10.0]).expect("valid matrix");
    let mut km = KMeans::new(2).with_init_centroids(init);
    km.fit(&data).expect("fit succeeds");

    let labels = km.labels();
    let (a, b) = (labels[0], labels[50]);
    assert_ne!(a, b, "FALSIFIED KM-009: blobs share a cluster");
    for (i, &label) in labels.iter().enumerate() {
        let expected = if i < 50 { a } else { b };
        assert_eq!(label, expected, "FALSIFIED KM-009: sample {i} left its blob");
    }

    let centroids = km.centroids();
    for (k, center) in [(a, 0.0_f32), (b, 10.0)] {
        let dx = centroids.get(k, 0) - center;
        let dy = centroids.get(k, 1) - center;
        assert!(
            (dx * dx + dy * dy).sqrt() < 0.5,
            "FALSIFIED KM-009: centroid {k} not within 0.5 of ({center}, {center})"
        );
    }
}

#[cfg(test)]
mod kmeans_proptest_falsify {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Labels stay in range and inertia stays non-negative for
        /// arbitrary well-spread data.
        #[test]
        fn falsify_km_prop_labels_and_inertia(
            offsets in prop::collection::vec(-5.0_f32..5.0, 8),
            seed in 0u64..1000,
        ) {
            // Two spread-out groups so no cluster can go empty.
            let mut data = Vec::with_capacity(16);
            for (i, &off) in offsets.iter().enumerate() {
                let base = if i < 4 { 0.0 } else { 100.0 };
                data.push(base + off);
                data.push(base - off);
            }
            let x = Matrix::from_vec(8, 2, data).expect("valid matrix");

            let mut km = KMeans::new(2).with_random_state(seed);
            if km.fit(&x).is_ok() {
                prop_assert!(km.labels().iter().all(|&l| l < 2));
                prop_assert!(km.inertia() >= 0.0);
            }
        }
    }
}
