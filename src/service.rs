//! Query-facing service: validation, estimation, and matching in one call.
//!
//! The service owns its collaborators. The estimator and dataset are
//! injected at construction; there is no global model slot, and the
//! dataset is loaded once rather than re-read per query.

use crate::data::{NeighborhoodDataset, NeighborhoodRecord};
use crate::encoding::RentQuery;
use crate::error::{ArrendarError, Result};
use crate::estimate::{ConfidenceInterval, RentEstimator};
use crate::similarity::{NeighborhoodMatcher, SimilarityMatch, DEFAULT_TOP_N};
use serde::Serialize;

/// Everything a caller gets back from one prediction: the estimate, its
/// uncertainty band, the closest neighborhoods, and an echo of the input.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    /// Point rent estimate, non-negative, rounded to 2 decimals.
    pub predicted_rent: f32,
    /// 95% band from ensemble spread; absent when the model exposes no
    /// member estimators.
    pub confidence_interval: Option<ConfidenceInterval>,
    /// Closest dataset neighborhoods, ascending by distance.
    pub similar_neighborhoods: Vec<SimilarityMatch>,
    /// The query as received.
    pub input: RentQuery,
}

/// Liveness and readiness snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceHealth {
    /// Always "healthy" while the process answers at all.
    pub status: &'static str,
    /// Whether a fitted model is attached.
    pub model_loaded: bool,
}

/// Serves rent predictions against an injected model and dataset.
///
/// A service without an estimator still answers health checks and
/// neighborhood listings; predictions fail with
/// [`ArrendarError::ModelUnavailable`].
///
/// # Examples
///
/// ```no_run
/// use arrendar::data::NeighborhoodDataset;
/// use arrendar::estimate::{RentEstimator, TrainingOptions};
/// use arrendar::service::RentService;
///
/// let dataset = NeighborhoodDataset::from_csv("data/rental_data.csv").unwrap();
/// let (estimator, _) = RentEstimator::train(&dataset, &TrainingOptions::default()).unwrap();
/// let service = RentService::new(dataset).with_estimator(estimator);
/// assert!(service.health().model_loaded);
/// ```
#[derive(Debug, Clone)]
pub struct RentService {
    estimator: Option<RentEstimator>,
    dataset: NeighborhoodDataset,
    top_n: usize,
}

impl RentService {
    /// Creates a service over a dataset, without a model attached.
    #[must_use]
    pub fn new(dataset: NeighborhoodDataset) -> Self {
        Self {
            estimator: None,
            dataset,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Attaches a fitted estimator.
    #[must_use]
    pub fn with_estimator(mut self, estimator: RentEstimator) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Overrides how many similar neighborhoods each prediction returns.
    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Answers one rent query.
    ///
    /// Validates and encodes the input, produces the point estimate and
    /// interval, ranks similar neighborhoods, and merges everything into
    /// a [`PredictionResult`].
    ///
    /// # Errors
    ///
    /// Returns [`ArrendarError::ModelUnavailable`] when no estimator is
    /// attached, or [`ArrendarError::InvalidInput`] when a numeric field
    /// fails validation. Unknown category labels do not fail; they encode
    /// as 0.
    pub fn predict(&self, query: &RentQuery) -> Result<PredictionResult> {
        let estimator = self
            .estimator
            .as_ref()
            .ok_or(ArrendarError::ModelUnavailable)?;

        let features = query.encode()?;
        let estimate = estimator.estimate(&features);
        let similar_neighborhoods =
            NeighborhoodMatcher::new(&self.dataset).find_similar(&features, self.top_n);

        Ok(PredictionResult {
            predicted_rent: estimate.point,
            confidence_interval: estimate.interval,
            similar_neighborhoods,
            input: query.clone(),
        })
    }

    /// Reports service health.
    #[must_use]
    pub fn health(&self) -> ServiceHealth {
        ServiceHealth {
            status: "healthy",
            model_loaded: self.estimator.is_some(),
        }
    }

    /// Lists the known neighborhoods in dataset order.
    #[must_use]
    pub fn neighborhoods(&self) -> &[NeighborhoodRecord] {
        self.dataset.records()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{FamilyType, FurnishedType};
    use crate::estimate::TrainingOptions;

    fn record(name: &str, distance_km: f32, rooms: u32, rent: f32) -> NeighborhoodRecord {
        NeighborhoodRecord {
            name: name.to_string(),
            distance_to_downtown: distance_km,
            transit_score: 70.0,
            crime_rate: 3.2,
            amenities_count: 10.0,
            family_type: FamilyType::Family,
            people_count: 4,
            rooms_required: rooms,
            has_children: true,
            parking_required: true,
            furnished_type: FurnishedType::FullyFurnished,
            average_rent: rent,
        }
    }

    fn dataset() -> NeighborhoodDataset {
        NeighborhoodDataset::new(
            (0..20)
                .map(|i| {
                    record(
                        &format!("N{i}"),
                        1.0 + i as f32,
                        (i % 4 + 1) as u32,
                        800.0 + 60.0 * i as f32,
                    )
                })
                .collect(),
        )
    }

    fn query() -> RentQuery {
        RentQuery {
            distance: 5.0,
            transit_score: 70.0,
            crime_rate: 3.2,
            amenities: 10.0,
            family_type: "Family".to_string(),
            people_count: 4,
            rooms_required: 3,
            has_children: true,
            parking_required: true,
            furnished_type: "Fully-Furnished".to_string(),
        }
    }

    fn fitted_service() -> RentService {
        let data = dataset();
        let options = TrainingOptions {
            n_estimators: 10,
            ..TrainingOptions::default()
        };
        let (estimator, _) = RentEstimator::train(&data, &options).expect("train");
        RentService::new(data).with_estimator(estimator)
    }

    #[test]
    fn test_predict_without_model_fails() {
        let service = RentService::new(dataset());
        let err = service.predict(&query()).expect_err("no model attached");
        assert!(matches!(err, ArrendarError::ModelUnavailable));
    }

    #[test]
    fn test_predict_returns_estimate_and_matches() {
        let result = fitted_service().predict(&query()).expect("predict");

        assert!(result.predicted_rent >= 0.0);
        let interval = result.confidence_interval.expect("interval present");
        assert!(interval.lower <= result.predicted_rent);
        assert!(result.predicted_rent <= interval.upper);
        assert_eq!(result.similar_neighborhoods.len(), DEFAULT_TOP_N);
        assert_eq!(result.input, query());
    }

    #[test]
    fn test_predict_rejects_invalid_numeric_field() {
        let mut bad = query();
        bad.distance = f32::NAN;
        let err = fitted_service().predict(&bad).expect_err("NaN rejected");
        assert!(matches!(err, ArrendarError::InvalidInput { .. }));
    }

    #[test]
    fn test_predict_unknown_category_still_succeeds() {
        let mut odd = query();
        odd.family_type = "Student".to_string();
        assert!(fitted_service().predict(&odd).is_ok());
    }

    #[test]
    fn test_predict_deterministic() {
        let service = fitted_service();
        let a = service.predict(&query()).expect("predict");
        let b = service.predict(&query()).expect("predict");
        assert_eq!(a.predicted_rent, b.predicted_rent);
        assert_eq!(a.confidence_interval, b.confidence_interval);
    }

    #[test]
    fn test_top_n_override() {
        let service = fitted_service().with_top_n(5);
        let result = service.predict(&query()).expect("predict");
        assert_eq!(result.similar_neighborhoods.len(), 5);
    }

    #[test]
    fn test_health_reflects_model_presence() {
        let bare = RentService::new(dataset());
        assert_eq!(bare.health().status, "healthy");
        assert!(!bare.health().model_loaded);
        assert!(fitted_service().health().model_loaded);
    }

    #[test]
    fn test_neighborhoods_listing_in_dataset_order() {
        let service = RentService::new(dataset());
        let names: Vec<&str> = service.neighborhoods().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names[0], "N0");
        assert_eq!(names.len(), 20);
    }
}
