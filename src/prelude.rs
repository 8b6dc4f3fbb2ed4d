//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use mezclar::prelude::*;
//! ```

pub use crate::cluster::KMeans;
pub use crate::error::{MezclarError, Result};
pub use crate::metrics::{inertia, silhouette_score};
pub use crate::mixture::{CategoricalMixture, GaussianMixture, MixtureModel};
pub use crate::primitives::{Matrix, Vector};
pub use crate::traits::UnsupervisedEstimator;
