//! Weighted-distance neighborhood matching.
//!
//! Ranks dataset neighborhoods by weighted Euclidean distance to a
//! query in encoded feature space. The weights are fixed domain
//! priors, not learned: rooms and family type dominate, transit and
//! amenities matter less.

use crate::data::{NeighborhoodDataset, NeighborhoodRecord};
use crate::encoding::{FeatureVector, FEATURE_COUNT};
use serde::Serialize;

/// Per-feature weights applied inside the squared distance, in the
/// canonical feature order.
pub const SIMILARITY_WEIGHTS: [f32; FEATURE_COUNT] = [
    0.8, // distance to downtown
    0.6, // transit score
    0.7, // crime rate
    0.5, // amenities count
    1.5, // family type
    1.2, // people count
    2.0, // rooms required
    1.0, // has children
    0.8, // parking required
    1.0, // furnished type
];

/// Default number of matches returned per query.
pub const DEFAULT_TOP_N: usize = 3;

/// One ranked match: a dataset neighborhood and its distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatch {
    /// Neighborhood name.
    pub neighborhood: String,
    /// Weighted Euclidean distance to the query (0 for an exact match).
    pub distance: f32,
    /// Observed average rent of the matched neighborhood.
    pub average_rent: f32,
    /// The full matched record.
    pub record: NeighborhoodRecord,
}

/// Computes the weighted Euclidean distance between two encoded vectors.
///
/// `sqrt(Σ wᵢ (aᵢ - bᵢ)²)` over the canonical feature order. Symmetric,
/// non-negative, and zero exactly when the encoded vectors are equal.
#[must_use]
pub fn weighted_distance(a: &FeatureVector, b: &FeatureVector) -> f32 {
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .zip(SIMILARITY_WEIGHTS)
        .map(|((x, y), w)| w * (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

/// Ranks neighborhoods in a dataset by similarity to encoded queries.
///
/// Borrows the dataset read-only; matching never mutates it, so one
/// matcher can serve any number of queries.
///
/// # Examples
///
/// ```no_run
/// use arrendar::data::NeighborhoodDataset;
/// use arrendar::similarity::NeighborhoodMatcher;
///
/// let dataset = NeighborhoodDataset::from_csv("data/rental_data.csv").unwrap();
/// let matcher = NeighborhoodMatcher::new(&dataset);
/// let query = dataset.records()[0].features();
/// let matches = matcher.find_similar(&query, 3);
/// assert!(matches.len() <= 3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct NeighborhoodMatcher<'a> {
    dataset: &'a NeighborhoodDataset,
}

impl<'a> NeighborhoodMatcher<'a> {
    /// Creates a matcher over a dataset.
    #[must_use]
    pub fn new(dataset: &'a NeighborhoodDataset) -> Self {
        Self { dataset }
    }

    /// Returns up to `top_n` neighborhoods closest to the query,
    /// ascending by distance.
    ///
    /// Ties keep dataset order (the sort is stable). An empty dataset
    /// yields an empty vector; `top_n` larger than the dataset yields
    /// every record ranked.
    #[must_use]
    pub fn find_similar(&self, query: &FeatureVector, top_n: usize) -> Vec<SimilarityMatch> {
        let mut matches: Vec<SimilarityMatch> = self
            .dataset
            .iter()
            .map(|record| SimilarityMatch {
                neighborhood: record.name.clone(),
                distance: weighted_distance(query, &record.features()),
                average_rent: record.average_rent,
                record: record.clone(),
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_n);
        matches
    }
}
