//! Categorical mixture model for discrete data.

use serde::{Deserialize, Serialize};

use super::{FitState, MixtureModel};
use crate::error::{MezclarError, Result};
use crate::primitives::{Matrix, Vector};
use crate::random;

/// Complete parameter snapshot produced by one categorical M-step.
#[derive(Debug, Clone)]
pub struct CategoricalParams {
    /// Mixing weights (length K).
    pub weights: Vector<f32>,
    /// Per-feature category probabilities, one K × C_j matrix per
    /// feature; every row sums to 1.
    pub category_probs: Vec<Matrix<f32>>,
}

/// Mixture of products of categorical distributions, fitted with EM.
///
/// Each feature `j` takes one of `C_j` categories; within a component the
/// features are independent, so a component assigns a sample the
/// probability `Π_j α_j[k, x_ij]`. Data is a `Matrix<f32>` of integer
/// category codes; anything that does not round to a code in `[0, C_j)`
/// is rejected.
///
/// # Examples
///
/// ```
/// use mezclar::prelude::*;
///
/// // Ten responses over two binary questions, two opposite patterns.
/// let data = Matrix::from_vec(10, 2, vec![
///     0.0, 1.0,  0.0, 1.0,  0.0, 1.0,  0.0, 1.0,  0.0, 1.0,
///     1.0, 0.0,  1.0, 0.0,  1.0, 0.0,  1.0, 0.0,  1.0, 0.0,
/// ]).expect("Valid matrix dimensions and data length");
///
/// let mut cmm = CategoricalMixture::new(2, vec![2, 2]).with_random_state(42);
/// let converged = cmm.fit(&data).expect("Fit succeeds with valid data");
/// assert!(converged);
///
/// let labels = cmm.predict(&data).expect("data matches model shape");
/// assert_ne!(labels[0], labels[5]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalMixture {
    /// Number of mixture components.
    n_components: usize,
    /// Category cardinality per feature.
    n_categories: Vec<usize>,
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
    /// Per-feature category probabilities (K × C_j each).
    category_probs: Vec<Matrix<f32>>,
    /// Converged fit, if any.
    fit_state: Option<FitState>,
}

impl CategoricalMixture {
    /// Creates a new categorical mixture with random initial parameters.
    /// `n_categories` holds the number of categories for each feature.
    #[must_use]
    pub fn new(n_components: usize, n_categories: Vec<usize>) -> Self {
        let mut rng = random::rng_from_seed(None);
        let (weights, category_probs) =
            Self::draw_parameters(n_components, &n_categories, &mut rng);

        Self {
            n_components,
            n_categories,
            tol: 1e-4,
            max_iter: 100,
            random_state: None,
            verbose: false,
            weights,
            category_probs,
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
        let (weights, category_probs) =
            Self::draw_parameters(self.n_components, &self.n_categories, &mut rng);
        self.weights = weights;
        self.category_probs = category_probs;
        self
    }

    fn draw_parameters(
        n_components: usize,
        n_categories: &[usize],
        rng: &mut rand::rngs::StdRng,
    ) -> (Vector<f32>, Vec<Matrix<f32>>) {
        let weights = Vector::from_vec(random::symmetric_dirichlet(rng, n_components));

        let mut category_probs = Vec::with_capacity(n_categories.len());
        for &cardinality in n_categories {
            let mut data = Vec::with_capacity(n_components * cardinality);
            for _ in 0..n_components {
                data.extend(random::symmetric_dirichlet(rng, cardinality));
            }
            category_probs.push(
                Matrix::from_vec(n_components, cardinality, data)
                    .expect("Category matrix dimensions match generated data length"),
            );
        }

        (weights, category_probs)
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

    /// Returns the per-feature category probabilities, one K × C_j
    /// matrix per feature.
    ///
    /// # Panics
    ///
    /// Panics if model is not fitted.
    #[must_use]
    pub fn category_probs(&self) -> &[Matrix<f32>] {
        assert!(self.is_fitted(), "Model not fitted. Call fit() first.");
        &self.category_probs
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

    /// Checks that the data is a valid code matrix for this model: one
    /// column per cardinality, every value rounding to an integer in
    /// `[0, C_j)`.
    fn validate_codes(&self, x: &Matrix<f32>) -> Result<()> {
        let (n_samples, n_features) = x.shape();

        if n_features != self.n_categories.len() {
            return Err(MezclarError::DimensionMismatch {
                expected: format!("{n_samples}x{}", self.n_categories.len()),
                actual: format!("{n_samples}x{n_features}"),
            });
        }

        for j in 0..n_features {
            let cardinality = self.n_categories[j];
            for i in 0..n_samples {
                let value = x.get(i, j);
                let rounded = value.round();
                if !value.is_finite()
                    || (value - rounded).abs() > 1e-6
                    || rounded < 0.0
                    || rounded as usize >= cardinality
                {
                    return Err(MezclarError::validation(format!(
                        "feature {j} value {value} at row {i} is not a category code in [0, {cardinality})"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl MixtureModel for CategoricalMixture {
    type Params = CategoricalParams;

    fn n_components(&self) -> usize {
        self.n_components
    }

    /// Free parameters: K−1 independent weights plus K·(C_j−1) per
    /// feature.
    fn n_parameters(&self) -> usize {
        let category_params: usize = self
            .n_categories
            .iter()
            .map(|&cardinality| self.n_components * (cardinality - 1))
            .sum();
        (self.n_components - 1) + category_params
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
        if x.n_rows() == 0 {
            return Err(MezclarError::empty_input("training data"));
        }
        if self.n_components == 0 {
            return Err(MezclarError::InvalidHyperparameter {
                param: "n_components".to_string(),
                value: "0".to_string(),
                constraint: ">= 1".to_string(),
            });
        }
        if self.n_categories.is_empty() {
            return Err(MezclarError::InvalidHyperparameter {
                param: "n_categories".to_string(),
                value: "[]".to_string(),
                constraint: "at least one feature".to_string(),
            });
        }
        if let Some((j, &cardinality)) = self
            .n_categories
            .iter()
            .enumerate()
            .find(|(_, &cardinality)| cardinality < 2)
        {
            return Err(MezclarError::InvalidHyperparameter {
                param: format!("n_categories[{j}]"),
                value: cardinality.to_string(),
                constraint: ">= 2".to_string(),
            });
        }
        if self.tol <= 0.0 {
            return Err(MezclarError::InvalidHyperparameter {
                param: "tol".to_string(),
                value: format!("{}", self.tol),
                constraint: "> 0".to_string(),
            });
        }

        self.validate_codes(x)?;

        if x.n_rows() < self.n_components {
            return Err(MezclarError::validation(format!(
                "n_samples = {} must be >= n_components = {}",
                x.n_rows(),
                self.n_components
            )));
        }

        self.fit_state = None;
        Ok(())
    }

    #[allow(clippy::needless_range_loop)]
    fn e_step(&self, x: &Matrix<f32>) -> Result<(f64, Matrix<f32>)> {
        self.validate_codes(x)?;

        let (n_samples, n_features) = x.shape();
        let k = self.n_components;
        let mut resp = vec![0.0_f32; n_samples * k];
        let mut ll = 0.0_f64;

        for i in 0..n_samples {
            let mut weighted = vec![0.0_f64; k];
            let mut total = 0.0_f64;

            for c in 0..k {
                let mut membership = f64::from(self.weights[c]);
                for j in 0..n_features {
                    let code = x.get(i, j).round() as usize;
                    membership *= f64::from(self.category_probs[j].get(c, code));
                }
                weighted[c] = membership;
                total += membership;
            }

            // Clamp away from zero before the log.
            ll += total.max(f64::MIN_POSITIVE).ln();

            if total > 0.0 {
                for c in 0..k {
                    resp[i * k + c] = (weighted[c] / total) as f32;
                }
            } else {
                // Uniform fallback when every membership underflows.
                for c in 0..k {
                    resp[i * k + c] = 1.0 / k as f32;
                }
            }
        }

        let resp = Matrix::from_vec(n_samples, k, resp)
            .expect("Responsibility matrix dimensions match preallocated vector length");
        Ok((ll, resp))
    }

    fn m_step(&self, x: &Matrix<f32>, resp: &Matrix<f32>) -> Result<CategoricalParams> {
        self.validate_codes(x)?;

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

        // Expected category counts, normalized per component.
        let mut category_probs = Vec::with_capacity(n_features);
        for j in 0..n_features {
            let cardinality = self.n_categories[j];
            let mut expected = vec![0.0_f64; k * cardinality];

            for i in 0..n_samples {
                let code = x.get(i, j).round() as usize;
                for c in 0..k {
                    expected[c * cardinality + code] += f64::from(resp.get(i, c));
                }
            }

            let mut probs = vec![0.0_f32; k * cardinality];
            for c in 0..k {
                for cat in 0..cardinality {
                    probs[c * cardinality + cat] =
                        (expected[c * cardinality + cat] / counts[c]) as f32;
                }
            }
            category_probs.push(
                Matrix::from_vec(k, cardinality, probs)
                    .expect("Category matrix dimensions match accumulated data length"),
            );
        }

        Ok(CategoricalParams {
            weights: Vector::from_vec(weights),
            category_probs,
        })
    }

    fn apply_params(&mut self, params: CategoricalParams) {
        self.weights = params.weights;
        self.category_probs = params.category_probs;
    }

    fn fit_state(&self) -> Option<&FitState> {
        self.fit_state.as_ref()
    }

    fn set_fit_state(&mut self, state: FitState) {
        self.fit_state = Some(state);
    }
}

#[cfg(test)]
#[path = "categorical_tests.rs"]
mod tests;
