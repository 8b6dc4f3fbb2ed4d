// =========================================================================
// FALSIFY-VE: Vector primitives contract
//
// Euclidean arithmetic invariants behind the distance and density loops:
// norms, dot products, and moment helpers must satisfy the textbook
// identities or every downstream assignment step is suspect.
//
// References:
//   - Cauchy-Schwarz inequality: |dot(u,v)| <= norm(u) * norm(v)
// =========================================================================

use super::*;

/// FALSIFY-VE-001: Dot product is commutative: dot(u,v) = dot(v,u)
#[test]
fn falsify_ve_001_dot_commutative() {
    let u = Vector::from_slice(&[1.0, 2.0, 3.0]);
    let v = Vector::from_slice(&[4.0, 5.0, 6.0]);

    let uv = u.dot(&v);
    let vu = v.dot(&u);

    assert!(
        (uv - vu).abs() < 1e-6,
        "FALSIFIED VE-001: dot(u,v)={uv} != dot(v,u)={vu}"
    );
}

/// FALSIFY-VE-002: Norm is non-negative and matches the 3-4-5 triangle
#[test]
fn falsify_ve_002_norm_nonneg() {
    let v = Vector::from_slice(&[-3.0, 4.0]);
    let n = v.norm();

    assert!(n >= 0.0, "FALSIFIED VE-002: norm={n}, expected >= 0.0");
    assert!(
        (n - 5.0).abs() < 1e-5,
        "FALSIFIED VE-002: norm of [-3,4]={n}, expected 5.0"
    );
}

/// FALSIFY-VE-003: Cauchy-Schwarz: |dot(u,v)| <= norm(u) * norm(v)
#[test]
fn falsify_ve_003_cauchy_schwarz() {
    let u = Vector::from_slice(&[1.0, -2.0, 3.0, 0.5]);
    let v = Vector::from_slice(&[4.0, 0.0, -1.0, 2.0]);

    let dot = u.dot(&v).abs();
    let bound = u.norm() * v.norm();

    assert!(
        dot <= bound + 1e-5,
        "FALSIFIED VE-003: |dot|={dot} > norm(u)*norm(v)={bound}"
    );
}

/// FALSIFY-VE-004: Mean equals sum / length
#[test]
fn falsify_ve_004_mean_equals_sum_over_len() {
    let v = Vector::from_slice(&[2.0, 4.0, 6.0, 8.0, 10.0]);

    let mean = v.mean();
    let expected = v.sum() / v.len() as f32;

    assert!(
        (mean - expected).abs() < 1e-6,
        "FALSIFIED VE-004: mean={mean}, expected sum/len={expected}"
    );
    assert!(
        (mean - 6.0).abs() < 1e-6,
        "FALSIFIED VE-004: mean={mean}, expected 6.0"
    );
}

/// FALSIFY-VE-005: norm_squared(u - v) expands to the squared distance
#[test]
fn falsify_ve_005_distance_expansion() {
    let u = Vector::from_slice(&[1.0, 2.0, 3.0]);
    let v = Vector::from_slice(&[4.0, 6.0, 3.0]);

    let diff = &u - &v;
    let direct = diff.norm_squared();
    let expanded = u.norm_squared() - 2.0 * u.dot(&v) + v.norm_squared();

    assert!(
        (direct - expanded).abs() < 1e-4,
        "FALSIFIED VE-005: |u-v|^2={direct} != expansion={expanded}"
    );
    assert!(
        (direct - 25.0).abs() < 1e-5,
        "FALSIFIED VE-005: |u-v|^2={direct}, expected 25.0"
    );
}

/// FALSIFY-VE-006: Population variance is non-negative and shift-invariant
#[test]
fn falsify_ve_006_variance_shift_invariant() {
    let v = Vector::from_slice(&[1.0, 2.0, 3.0, 4.0]);
    let shifted = Vector::from_slice(&[101.0, 102.0, 103.0, 104.0]);

    let var = v.variance();
    let var_shifted = shifted.variance();

    assert!(var >= 0.0, "FALSIFIED VE-006: variance={var}, expected >= 0");
    assert!(
        (var - var_shifted).abs() < 1e-3,
        "FALSIFIED VE-006: variance changed under shift: {var} vs {var_shifted}"
    );
}
