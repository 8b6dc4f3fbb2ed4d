//! Gaussian mixture model with isotropic components.

use serde::{Deserialize, Serialize};

use super::{FitState, MixtureModel};
use crate::error::{MezclarError, Result};
use crate::primitives::{Matrix, Vector};
use crate::random;

/// Complete parameter snapshot produced by one Gaussian M-step.
#[derive(Debug, Clone)]
pub struct GaussianParams {
    /// Mixing weights (length K).
    pub weights: Vector<f32>,
    /// Component means (K × D).
    pub means: Matrix<f32>,
    /// Isotropic component variances (length K).
    pub variances: Vector<f32>,
}

/// Mixture of isotropic Gaussians fitted with EM.
///
/// Each component is a D-dimensional Gaussian with a single scalar
/// variance, so covariances are `σ²_k · I`. Soft assignments come from
/// [`MixtureModel::predict_proba`]; hard assignments from
/// [`MixtureModel::predict`].
///
/// # Algorithm
///
/// 1. Mixing weights start at a Dirichlet(1,…,1) draw and means at i.i.d.
///    standard normal draws; variances are seeded from the pooled
///    per-feature variance of the data when fitting starts
/// 2. **E-step**: weighted isotropic densities, normalized per sample into
///    responsibilities; log-likelihood accumulates in `f64`
/// 3. **M-step**: weights from average responsibility, means from
///    responsibility-weighted averages, variances from the weighted squared
///    deviation about the new means (aggregated over all D dimensions)
/// 4. Repeat until the relative log-likelihood change drops below `tol`
///
/// # Examples
///
/// ```
/// use mezclar::prelude::*;
///
/// let data = Matrix::from_vec(6, 2, vec![
///     1.0, 1.0, 1.1, 1.0, 1.0, 1.1,
///     5.0, 5.0, 5.1, 5.0, 5.0, 5.1,
/// ]).expect("Valid matrix dimensions and data length");
///
/// let mut gmm = GaussianMixture::new(2, 2).with_random_state(42);
/// let converged = gmm.fit(&data).expect("Fit succeeds with valid data");
/// assert!(converged);
///
/// let proba = gmm.predict_proba(&data).expect("data matches model shape");
/// assert_eq!(proba.shape(), (6, 2));
/// ```
///
/// # Performance
///
/// - Time complexity: O(nkdi) where n=samples, k=components, d=features, i=iterations
/// - Space complexity: O(nk + kd)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianMixture {
    /// Number of mixture components.
    n_components: usize,
    /// Expected feature count.
    n_features: usize,
    /// Relative log-likelihood tolerance.
    tol: f64,
    /// Maximum number of EM iterations.
    max_iter: usize,
    /// Random seed for parameter initialization.
    random_state: Option<u64>,
    /// Print one progress line per iteration.
    verbose: bool,
    /// Mixing weights (length K).
    weights: Vector<f32>,
    /// Component means (K × D).
    means: Matrix<f32>,
    /// Isotropic component variances (length K).
    variances: Vector<f32>,
    /// Converged fit, if any.
    fit_state: Option<FitState>,
}

impl GaussianMixture {
    /// Creates a new Gaussian mixture with random initial parameters.
    #[must_use]
    pub fn new(n_components: usize, n_features: usize) -> Self {
        let mut rng = random::rng_from_seed(None);
        let (weights, means) = Self::draw_parameters(n_components, n_features, &mut rng);

        Self {
            n_components,
            n_features,
            tol: 1e-4,
            max_iter: 100,
            random_state: None,
            verbose: false,
            weights,
            means,
            variances: Vector::from_vec(vec![1.0; n_components]),
            fit_state: None,
        }
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Sets the maximum number of EM iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Enables per-iteration progress output.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Sets the random seed and redraws all random initial parameters
    /// from it, so seeding is deterministic regardless of builder order.
    #[must_use]
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        let mut rng = random::rng_from_seed(self.random_state);
        let (weights, means) = Self::draw_parameters(self.n_components, self.n_features, &mut rng);
        self.weights = weights;
        self.means = means;
        self
    }

    fn draw_parameters(
        n_components: usize,
        n_features: usize,
        rng: &mut rand::rngs::StdRng,
    ) -> (Vector<f32>, Matrix<f32>) {
        let weights = Vector::from_vec(random::symmetric_dirichlet(rng, n_components));

        let mut mean_data = Vec::with_capacity(n_components * n_features);
        for _ in 0..n_components * n_features {
            mean_data.push(random::standard_normal(rng));
        }
        let means = Matrix::from_vec(n_components, n_features, mean_data)
            .expect("Mean matrix dimensions match generated data length");

        (weights, means)
    }

    /// Returns the mixing weights.
    ///
    /// # Panics
    ///
    /// Panics if model is not fitted.
    #[must_use]
    pub fn weights(&self) -> &Vector<f32> {
        assert!(self.is_fitted(), "Model not fitted. Call fit() first.");
        &self.weights
    }

    /// Returns the component means (K × D).
    ///
    /// # Panics
    ///
    /// Panics if model is not fitted.
    #[must_use]
    pub fn means(&self) -> &Matrix<f32> {
        assert!(self.is_fitted(), "Model not fitted. Call fit() first.");
        &self.means
    }

    /// Returns the isotropic component variances.
    ///
    /// # Panics
    ///
    /// Panics if model is not fitted.
    #[must_use]
    pub fn variances(&self) -> &Vector<f32> {
        assert!(self.is_fitted(), "Model not fitted. Call fit() first.");
        &self.variances
    }

    /// Returns the training responsibilities from the converged fit.
    ///
    /// # Panics
    ///
    /// Panics if model is not fitted.
    #[must_use]
    pub fn responsibilities(&self) -> &Matrix<f32> {
        let state = self
            .fit_state
            .as_ref()
            .expect("Model not fitted. Call fit() first.");
        &state.responsibilities
    }

    /// Returns the maximized log-likelihood of the converged fit.
    #[must_use]
    pub fn max_ll(&self) -> Option<f64> {
        self.fit_state.as_ref().map(|state| state.max_ll)
    }

    /// Returns the training sample count of the converged fit.
    #[must_use]
    pub fn n_train(&self) -> Option<usize> {
        self.fit_state.as_ref().map(|state| state.n_train)
    }

    /// Returns true if the model has converged on some training data.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.fit_state.is_some()
    }
}

impl MixtureModel for GaussianMixture {
    type Params = GaussianParams;

    fn n_components(&self) -> usize {
        self.n_components
    }

    /// Free parameters: K−1 independent weights, K·D means, K variances.
    fn n_parameters(&self) -> usize {
        (self.n_components - 1) + self.n_components * self.n_features + self.n_components
    }

    fn tol(&self) -> f64 {
        self.tol
    }

    fn max_iter(&self) -> usize {
        self.max_iter
    }

    fn verbose(&self) -> bool {
        self.verbose
    }

    fn prepare(&mut self, x: &Matrix<f32>) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if n_samples == 0 {
            return Err(MezclarError::empty_input("training data"));
        }
        if self.n_components == 0 {
            return Err(MezclarError::InvalidHyperparameter {
                param: "n_components".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        if self.n_features == 0 {
            return Err(MezclarError::InvalidHyperparameter {
                param: "n_features".to_string(),
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
        if n_features != self.n_features {
            return Err(MezclarError::DimensionMismatch {
                expected: format!("{n_samples}x{}", self.n_features),
                actual: format!("{n_samples}x{n_features}"),
            });
        }
        if n_samples < self.n_components {
            return Err(MezclarError::validation(format!(
                "n_samples = {n_samples} must be >= n_components = {}",
                self.n_components
            )));
        }

        // Seed every component with the pooled per-feature variance of
        // the data.
        let mut pooled = 0.0;
        for j in 0..n_features {
            pooled += x.column(j).variance();
        }
        pooled = (pooled / n_features as f32).max(1e-6);
        self.variances = Vector::from_vec(vec![pooled; self.n_components]);
        self.fit_state = None;

        Ok(())
    }

    #[allow(clippy::needless_range_loop)]
    fn e_step(&self, x: &Matrix<f32>) -> Result<(f64, Matrix<f32>)> {
        let (n_samples, n_features) = x.shape();
        if n_features != self.n_features {
            return Err(MezclarError::DimensionMismatch {
                expected: format!("{n_samples}x{}", self.n_features),
                actual: format!("{n_samples}x{n_features}"),
            });
        }

        let k = self.n_components;
        let mut resp = vec![0.0_f32; n_samples * k];
        let mut ll = 0.0_f64;

        for i in 0..n_samples {
            let point = x.row_slice(i);
            let mut weighted = vec![0.0_f64; k];
            let mut total = 0.0_f64;

            for c in 0..k {
                let variance = f64::from(self.variances[c]);
                let mut dist_sq = 0.0_f64;
                for j in 0..n_features {
                    let diff = f64::from(point[j]) - f64::from(self.means.get(c, j));
                    dist_sq += diff * diff;
                }

                let norm = (2.0 * std::f64::consts::PI * variance).powf(-(n_features as f64) / 2.0);
                let density =
                    f64::from(self.weights[c]) * norm * (-dist_sq / (2.0 * variance)).exp();
                weighted[c] = density;
                total += density;
            }

            // Clamp away from zero before the log.
            ll += total.max(f64::MIN_POSITIVE).ln();

            if total > 0.0 {
                for c in 0..k {
                    resp[i * k + c] = (weighted[c] / total) as f32;
                }
            } else {
                // Uniform fallback when every density underflows.
                for c in 0..k {
                    resp[i * k + c] = 1.0 / k as f32;
                }
            }
        }

        let resp = Matrix::from_vec(n_samples, k, resp)
            .expect("Responsibility matrix dimensions match preallocated vector length");
        Ok((ll, resp))
    }

    #[allow(clippy::needless_range_loop)]
    fn m_step(&self, x: &Matrix<f32>, resp: &Matrix<f32>) -> Result<GaussianParams> {
        let (n_samples, n_features) = x.shape();
        let k = self.n_components;

        // Soft counts per component.
        let mut counts = vec![0.0_f64; k];
        for c in 0..k {
            for i in 0..n_samples {
                counts[c] += f64::from(resp.get(i, c));
            }
            counts[c] = counts[c].max(1e-6); // Regularization
        }

        let mut weights = vec![0.0_f32; k];
        for c in 0..k {
            weights[c] = (counts[c] / n_samples as f64) as f32;
        }

        let mut means = vec![0.0_f32; k * n_features];
        for c in 0..k {
            for j in 0..n_features {
                let mut acc = 0.0_f64;
                for i in 0..n_samples {
                    acc += f64::from(resp.get(i, c)) * f64::from(x.get(i, j));
                }
                means[c * n_features + j] = (acc / counts[c]) as f32;
            }
        }

        // Weighted squared deviation about the new means, pooled over all
        // D dimensions.
        let mut variances = vec![0.0_f32; k];
        for c in 0..k {
            let mut acc = 0.0_f64;
            for i in 0..n_samples {
                let mut dist_sq = 0.0_f64;
                for j in 0..n_features {
                    let diff = f64::from(x.get(i, j)) - f64::from(means[c * n_features + j]);
                    dist_sq += diff * diff;
                }
                acc += f64::from(resp.get(i, c)) * dist_sq;
            }
            let variance = acc / (n_features as f64 * counts[c]);
            variances[c] = (variance as f32).max(1e-6); // Regularization
        }

        Ok(GaussianParams {
            weights: Vector::from_vec(weights),
            means: Matrix::from_vec(k, n_features, means)
                .expect("Mean matrix dimensions match accumulated data length"),
            variances: Vector::from_vec(variances),
        })
    }

    fn apply_params(&mut self, params: GaussianParams) {
        self.weights = params.weights;
        self.means = params.means;
        self.variances = params.variances;
    }

    fn fit_state(&self) -> Option<&FitState> {
        self.fit_state.as_ref()
    }

    fn set_fit_state(&mut self, state: FitState) {
        self.fit_state = Some(state);
    }
}

#[cfg(test)]
#[path = "gaussian_tests.rs"]
mod tests;
