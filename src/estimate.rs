//! Rent estimation with ensemble-derived uncertainty.
//!
//! Wraps a fitted [`RandomForestRegressor`] and turns per-tree
//! disagreement into a 95% normal-approximation confidence interval.
//! This is not a calibrated prediction interval; it reflects only the
//! ensemble's internal spread, a documented limitation inherited from
//! the training procedure.

use crate::data::NeighborhoodDataset;
use crate::encoding::FeatureVector;
use crate::error::{ArrendarError, Result};
use crate::metrics::{r_squared, rmse};
use crate::model_selection::train_test_split;
use crate::primitives::Vector;
use crate::traits::Estimator;
use crate::tree::RandomForestRegressor;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Normal-approximation z value for a 95% interval.
const Z_95: f32 = 1.96;

/// A 95% confidence interval around a point estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound, clamped to zero.
    pub lower: f32,
    /// Upper bound.
    pub upper: f32,
}

/// A point rent estimate with its optional uncertainty band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentEstimate {
    /// Point estimate, non-negative, rounded to 2 decimals.
    pub point: f32,
    /// Interval derived from per-tree spread; absent when the model
    /// exposes no member estimators.
    pub interval: Option<ConfidenceInterval>,
}

/// Hold-out evaluation summary produced by [`RentEstimator::train`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// RMSE on the training partition.
    pub train_rmse: f32,
    /// RMSE on the held-out partition.
    pub test_rmse: f32,
    /// R² on the held-out partition.
    pub test_r2: f32,
}

/// Training knobs for [`RentEstimator::train`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingOptions {
    /// Number of trees in the forest.
    pub n_estimators: usize,
    /// Maximum depth per tree (None = unlimited).
    pub max_depth: Option<usize>,
    /// Fraction of samples held out for evaluation.
    pub test_size: f32,
    /// Seed for bootstrap sampling and the train/test shuffle.
    pub random_state: Option<u64>,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            test_size: 0.2,
            random_state: Some(42),
        }
    }
}

/// Produces rent estimates with an uncertainty band from a fitted forest.
///
/// The model is an explicit constructor dependency: there is no global
/// model slot, and an estimator cannot exist without a fitted forest.
///
/// # Examples
///
/// ```no_run
/// use arrendar::data::NeighborhoodDataset;
/// use arrendar::estimate::{RentEstimator, TrainingOptions};
///
/// let dataset = NeighborhoodDataset::from_csv("data/rental_data.csv").unwrap();
/// let (estimator, report) =
///     RentEstimator::train(&dataset, &TrainingOptions::default()).unwrap();
/// println!("test RMSE: {:.2}, R²: {:.3}", report.test_rmse, report.test_r2);
///
/// let estimate = estimator.estimate(&dataset.records()[0].features());
/// assert!(estimate.point >= 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentEstimator {
    forest: RandomForestRegressor,
}

impl RentEstimator {
    /// Wraps a fitted forest.
    ///
    /// # Errors
    ///
    /// Returns [`ArrendarError::ModelUnavailable`] if the forest has not
    /// been fitted.
    pub fn new(forest: RandomForestRegressor) -> Result<Self> {
        if !forest.is_fitted() {
            return Err(ArrendarError::ModelUnavailable);
        }
        Ok(Self { forest })
    }

    /// Trains a forest on the dataset and evaluates it on a hold-out
    /// partition.
    ///
    /// The returned estimator wraps the model fitted on the training
    /// partition; the report carries train RMSE, test RMSE, and test R².
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset is empty or too small to split.
    pub fn train(
        dataset: &NeighborhoodDataset,
        options: &TrainingOptions,
    ) -> Result<(Self, TrainingReport)> {
        let x = dataset.to_matrix()?;
        let y = dataset.rents();

        let (x_train, x_test, y_train, y_test) =
            train_test_split(&x, &y, options.test_size, options.random_state)?;

        let mut forest = RandomForestRegressor::new(options.n_estimators);
        if let Some(depth) = options.max_depth {
            forest = forest.with_max_depth(depth);
        }
        if let Some(seed) = options.random_state {
            forest = forest.with_random_state(seed);
        }
        forest.fit(&x_train, &y_train)?;

        let report = TrainingReport {
            train_rmse: rmse(&forest.predict(&x_train), &y_train),
            test_rmse: rmse(&forest.predict(&x_test), &y_test),
            test_r2: r_squared(&forest.predict(&x_test), &y_test),
        };

        Ok((Self { forest }, report))
    }

    /// Returns the number of member estimators in the wrapped forest.
    #[must_use]
    pub fn n_members(&self) -> usize {
        self.forest.n_trees()
    }

    /// Produces a point estimate and confidence interval for an encoded
    /// feature vector.
    ///
    /// The point is the forest mean, clamped to zero and rounded to 2
    /// decimals. The interval is `point ± 1.96σ` where σ is the standard
    /// deviation of per-tree predictions, with the lower bound clamped
    /// to zero. Deterministic: the fitted forest is frozen, so equal
    /// inputs yield equal outputs.
    #[must_use]
    pub fn estimate(&self, features: &FeatureVector) -> RentEstimate {
        let members = Vector::from_vec(self.forest.tree_predictions(features.as_slice()));
        let std = members.std();

        let point = round2(members.mean().max(0.0));
        let interval = ConfidenceInterval {
            lower: round2((point - Z_95 * std).max(0.0)),
            upper: round2(point + Z_95 * std),
        };

        RentEstimate {
            point,
            interval: Some(interval),
        }
    }

    /// Saves the wrapped forest as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.forest.save_json(path)
    }

    /// Loads a previously saved estimator.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or
    /// [`ArrendarError::ModelUnavailable`] if it holds an unfitted forest.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(RandomForestRegressor::load_json(path)?)
    }
}

/// Rounds to 2 decimal places.
fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
