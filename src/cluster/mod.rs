//! Clustering algorithms.
//!
//! Hard clustering via K-Means (Lloyd's algorithm). For soft probabilistic
//! clustering see the [`crate::mixture`] module.

mod kmeans;

pub use kmeans::KMeans;

#[cfg(test)]
mod tests_kmeans_contract;
