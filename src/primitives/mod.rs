//! Core compute primitives (Vector, Matrix).
//!
//! Row-major storage over plain `Vec<f32>`; the foundation for every
//! estimator in the crate.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;

#[cfg(test)]
mod tests_matrix_contract;
#[cfg(test)]
mod tests_vector_contract;
