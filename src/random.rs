//! Seedable sampling helpers shared by the stochastic estimators.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builds a `StdRng` from an optional seed.
pub(crate) fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Draws one standard normal sample via the Box-Muller transform.
pub(crate) fn standard_normal(rng: &mut StdRng) -> f32 {
    let u1: f32 = rng.gen_range(0.0001_f32..1.0_f32);
    let u2: f32 = rng.gen_range(0.0_f32..1.0_f32);
    (-2.0_f32 * u1.ln()).sqrt() * (2.0_f32 * std::f32::consts::PI * u2).cos()
}

/// Draws from a symmetric Dirichlet(1, ..., 1): unit exponentials,
/// normalized. The result is a valid probability vector of length `n`.
pub(crate) fn symmetric_dirichlet(rng: &mut StdRng, n: usize) -> Vec<f32> {
    let mut draws: Vec<f32> = (0..n)
        .map(|_| {
            let u: f32 = rng.gen_range(0.0001_f32..1.0_f32);
            -u.ln()
        })
        .collect();
    let total: f32 = draws.iter().sum();
    for d in &mut draws {
        *d /= total;
    }
    draws
}

/// Samples `amount` distinct indices from `0..length`, uniformly, without
/// replacement.
pub(crate) fn sample_rows(rng: &mut StdRng, length: usize, amount: usize) -> Vec<usize> {
    rand::seq::index::sample(rng, length, amount).into_vec()
}
