//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use arrendar::prelude::*;
//! ```

pub use crate::data::{NeighborhoodDataset, NeighborhoodRecord};
pub use crate::encoding::{FamilyType, FeatureVector, FurnishedType, RentQuery};
pub use crate::error::{ArrendarError, Result};
pub use crate::estimate::{ConfidenceInterval, RentEstimate, RentEstimator, TrainingOptions};
pub use crate::metrics::{mae, mse, r_squared, rmse};
pub use crate::model_selection::train_test_split;
pub use crate::primitives::{Matrix, Vector};
pub use crate::service::{PredictionResult, RentService, ServiceHealth};
pub use crate::similarity::{NeighborhoodMatcher, SimilarityMatch};
pub use crate::traits::Estimator;
pub use crate::tree::{DecisionTreeRegressor, RandomForestRegressor};
