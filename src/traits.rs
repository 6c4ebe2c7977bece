//! Core traits for regression estimators.
//!
//! These traits define the API contract shared by the tree models.

use crate::error::Result;
use crate::primitives::{Matrix, Vector};

/// Primary trait for supervised regression estimators.
///
/// Estimators implement fit/predict/score following sklearn conventions.
///
/// # Examples
///
/// ```
/// use arrendar::prelude::*;
///
/// // Training data: y = 2x
/// let x = Matrix::from_vec(5, 1, vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
/// let y = Vector::from_slice(&[2.0, 4.0, 6.0, 8.0, 10.0]);
///
/// let mut model = RandomForestRegressor::new(10).with_random_state(42);
/// model.fit(&x, &y).unwrap();
/// let predictions = model.predict(&x);
/// assert_eq!(predictions.len(), 5);
/// ```
pub trait Estimator {
    /// Fits the model to training data.
    ///
    /// # Errors
    ///
    /// Returns an error if fitting fails (dimension mismatch, empty data, etc.).
    fn fit(&mut self, x: &Matrix<f32>, y: &Vector<f32>) -> Result<()>;

    /// Predicts target values for input data.
    fn predict(&self, x: &Matrix<f32>) -> Vector<f32>;

    /// Computes the R² score on test data.
    fn score(&self, x: &Matrix<f32>, y: &Vector<f32>) -> f32;
}
