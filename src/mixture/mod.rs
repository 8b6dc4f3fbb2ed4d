//! Finite mixture models fitted with Expectation-Maximization.
//!
//! [`MixtureModel`] supplies the generic EM loop along with BIC scoring and
//! posterior prediction; [`GaussianMixture`] and [`CategoricalMixture`]
//! supply the distribution-specific E- and M-steps. Unlike K-Means, mixture
//! fitting reports non-convergence as a value: `fit` returns `Ok(false)`
//! when the iteration budget runs out before the log-likelihood settles.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{MezclarError, Result};
use crate::primitives::Matrix;

mod categorical;
mod gaussian;

pub use categorical::{CategoricalMixture, CategoricalParams};
pub use gaussian::{GaussianMixture, GaussianParams};


/// State captured when an EM fit converges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitState {
    /// Number of training samples.
    pub n_train: usize,
    /// Maximized total log-likelihood.
    pub max_ll: f64,
    /// Responsibilities from the E-step that detected convergence
    /// (`n_train` × K, each row sums to 1).
    pub responsibilities: Matrix<f32>,
}

/// A finite mixture distribution trainable with Expectation-Maximization.
///
/// Implementors provide the distribution-specific pieces (validation and
/// initialization, E-step, M-step, a typed parameter snapshot); the trait
/// provides the EM loop itself plus [`bic`](MixtureModel::bic),
/// [`predict_proba`](MixtureModel::predict_proba) and
/// [`predict`](MixtureModel::predict).
pub trait MixtureModel {
    /// Complete set of parameters produced by one M-step.
    type Params;

    /// Number of mixture components.
    fn n_components(&self) -> usize;

    /// Number of free parameters, used by [`bic`](MixtureModel::bic).
    fn n_parameters(&self) -> usize;

    /// Relative log-likelihood tolerance for the stopping criterion.
    fn tol(&self) -> f64;

    /// Maximum number of EM iterations.
    fn max_iter(&self) -> usize;

    /// Whether to print one progress line per iteration.
    fn verbose(&self) -> bool;

    /// Validates the data and performs data-dependent initialization.
    ///
    /// # Errors
    ///
    /// Returns an error when the data is malformed or incompatible with
    /// the model's hyperparameters.
    fn prepare(&mut self, x: &Matrix<f32>) -> Result<()>;

    /// E-step: the total log-likelihood of `x` under the current
    /// parameters, and the posterior responsibility matrix (n × K, each
    /// row summing to 1).
    ///
    /// # Errors
    ///
    /// Returns an error when `x` is incompatible with the model.
    fn e_step(&self, x: &Matrix<f32>) -> Result<(f64, Matrix<f32>)>;

    /// M-step: a complete parameter snapshot maximizing the expected
    /// log-likelihood given the responsibilities.
    ///
    /// # Errors
    ///
    /// Returns an error when `x` or `resp` is incompatible with the model.
    fn m_step(&self, x: &Matrix<f32>, resp: &Matrix<f32>) -> Result<Self::Params>;

    /// Replaces the current parameters with an M-step snapshot.
    fn apply_params(&mut self, params: Self::Params);

    /// The converged fit, if any.
    fn fit_state(&self) -> Option<&FitState>;

    /// Records a converged fit.
    fn set_fit_state(&mut self, state: FitState);

    /// Runs EM until the relative change in log-likelihood drops below
    /// [`tol`](MixtureModel::tol), or until
    /// [`max_iter`](MixtureModel::max_iter) iterations have run.
    ///
    /// Returns `Ok(true)` on convergence and `Ok(false)` when the
    /// iteration budget is exhausted first; only the converged case
    /// records a [`FitState`]. When the log-likelihood is exactly zero
    /// the stopping test falls back to absolute change.
    ///
    /// # Errors
    ///
    /// Returns an error when validation fails or a step rejects the data.
    fn fit(&mut self, x: &Matrix<f32>) -> Result<bool> {
        self.prepare(x)?;

        let start = Instant::now();
        let mut last = Instant::now();
        let mut previous_ll = f64::MIN;

        for iteration in 1..=self.max_iter() {
            let (ll, resp) = self.e_step(x)?;
            let params = self.m_step(x, &resp)?;
            self.apply_params(params);

            if self.verbose() {
                println!(
                    "iter {iteration}: ll = {ll:.5}  ({:.2} s)",
                    last.elapsed().as_secs_f64()
                );
                last = Instant::now();
            }

            let converged = if ll == 0.0 {
                (ll - previous_ll).abs() < self.tol()
            } else {
                ((ll - previous_ll) / ll).abs() < self.tol()
            };

            if converged {
                self.set_fit_state(FitState {
                    n_train: x.n_rows(),
                    max_ll: ll,
                    responsibilities: resp,
                });
                if self.verbose() {
                    println!(
                        "max ll = {ll:.5}  ({:.2} min, {iteration} iters)",
                        start.elapsed().as_secs_f64() / 60.0
                    );
                }
                return Ok(true);
            }

            previous_ll = ll;
        }

        Ok(false)
    }

    /// Bayesian information criterion of the converged fit:
    /// `-2·max_ll + p·ln(n_train)` with `p` free parameters. Lower is
    /// better.
    ///
    /// # Errors
    ///
    /// Returns an error if the model has not been successfully fitted.
    fn bic(&self) -> Result<f64> {
        let state = self.fit_state().ok_or_else(|| {
            MezclarError::Other("Model not fitted. Call fit() first.".to_string())
        })?;
        let p = self.n_parameters() as f64;
        Ok(-2.0 * state.max_ll + p * (state.n_train as f64).ln())
    }

    /// Posterior component probabilities for each sample, under the
    /// current parameters (one E-step; no state is modified).
    ///
    /// # Errors
    ///
    /// Returns an error when `x` is incompatible with the model.
    fn predict_proba(&self, x: &Matrix<f32>) -> Result<Matrix<f32>> {
        let (_, resp) = self.e_step(x)?;
        Ok(resp)
    }

    /// Hard component assignments: the row-wise argmax of
    /// [`predict_proba`](MixtureModel::predict_proba), ties resolving to
    /// the lowest component index.
    ///
    /// # Errors
    ///
    /// Returns an error when `x` is incompatible with the model.
    fn predict(&self, x: &Matrix<f32>) -> Result<Vec<usize>> {
        let resp = self.predict_proba(x)?;
        let (n_samples, n_components) = resp.shape();
        let mut labels = vec![0; n_samples];

        for (i, label) in labels.iter_mut().enumerate() {
            let mut best = 0;
            let mut best_prob = resp.get(i, 0);
            for k in 1..n_components {
                let prob = resp.get(i, k);
                if prob > best_prob {
                    best_prob = prob;
                    best = k;
                }
            }
            *label = best;
        }

        Ok(labels)
    }
}
