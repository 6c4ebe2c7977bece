//! Arrendar: rental price estimation with ensemble uncertainty, in pure Rust.
//!
//! Arrendar trains a random forest over neighborhood rental data, turns
//! per-tree disagreement into a 95% confidence band, and ranks the
//! closest neighborhoods by weighted distance in encoded feature space.
//!
//! # Quick Start
//!
//! ```no_run
//! use arrendar::prelude::*;
//!
//! // Load the dataset once; it stays read-only for every query.
//! let dataset = NeighborhoodDataset::from_csv("data/rental_data.csv").unwrap();
//!
//! // Train a forest and wrap it in a service.
//! let (estimator, report) =
//!     RentEstimator::train(&dataset, &TrainingOptions::default()).unwrap();
//! println!("test RMSE: {:.2}, R²: {:.3}", report.test_rmse, report.test_r2);
//!
//! let service = RentService::new(dataset).with_estimator(estimator);
//!
//! let query = RentQuery {
//!     distance: 5.0,
//!     transit_score: 70.0,
//!     crime_rate: 3.2,
//!     amenities: 10.0,
//!     family_type: "Family".to_string(),
//!     people_count: 4,
//!     rooms_required: 3,
//!     has_children: true,
//!     parking_required: true,
//!     furnished_type: "Fully-Furnished".to_string(),
//! };
//!
//! let result = service.predict(&query).unwrap();
//! println!("predicted rent: {:.2}", result.predicted_rent);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`encoding`]: Categorical codes and the canonical feature vector
//! - [`data`]: Neighborhood records, dataset, and CSV loading
//! - [`tree`]: Decision tree and random forest regressors
//! - [`metrics`]: Evaluation metrics (RMSE, MSE, MAE, R²)
//! - [`model_selection`]: Train/test splitting
//! - [`estimate`]: Rent estimation with confidence intervals
//! - [`similarity`]: Weighted-distance neighborhood matching
//! - [`service`]: Query-facing prediction service

pub mod data;
pub mod encoding;
pub mod error;
pub mod estimate;
pub mod metrics;
pub mod model_selection;
pub mod prelude;
pub mod primitives;
pub mod service;
pub mod similarity;
pub mod traits;
pub mod tree;
