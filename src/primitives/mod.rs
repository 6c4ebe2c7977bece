//! Core numeric primitives (Vector, Matrix).
//!
//! These types are the substrate for the tree ensemble and metrics.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
