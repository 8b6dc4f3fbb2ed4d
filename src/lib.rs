//! Mezclar: K-Means and EM mixture models in pure Rust.
//!
//! Mezclar provides hard clustering via K-Means and soft probabilistic
//! clustering via a generic Expectation-Maximization framework with
//! Gaussian and Categorical mixture variants, with a focus on ergonomic
//! APIs and comprehensive testing.
//!
//! # Quick Start
//!
//! ```
//! use mezclar::prelude::*;
//!
//! // Two well-separated groups of points
//! let x = Matrix::from_vec(6, 2, vec![
//!     1.0, 2.0,
//!     1.5, 1.8,
//!     1.0, 0.6,
//!     8.0, 8.0,
//!     9.0, 11.0,
//!     8.5, 9.0,
//! ]).unwrap();
//!
//! // Cluster with K-Means
//! let mut kmeans = KMeans::new(2).with_random_state(42);
//! kmeans.fit(&x).unwrap();
//!
//! let labels = kmeans.predict(&x);
//! assert_eq!(labels.len(), 6);
//! assert!(kmeans.inertia() >= 0.0);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`cluster`]: Hard clustering (K-Means)
//! - [`mixture`]: EM mixture models (Gaussian, Categorical)
//! - [`metrics`]: Evaluation metrics (inertia, silhouette)
//! - [`traits`]: Estimator traits
//! - [`error`]: Error types

pub mod cluster;
pub mod error;
pub mod metrics;
pub mod mixture;
pub mod prelude;
pub mod primitives;
pub mod traits;

mod random;

pub use error::{MezclarError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::UnsupervisedEstimator;
