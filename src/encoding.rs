//! Categorical encodings and the canonical feature vector.
//!
//! The integer codes here are a public contract: the fitted model, the
//! similarity matcher, and the dataset all rely on identical encodings
//! between training, querying, and comparison.

use crate::error::{ArrendarError, Result};
use serde::{Deserialize, Serialize};

/// Number of dimensions in the canonical feature vector.
pub const FEATURE_COUNT: usize = 10;

/// Canonical feature order. Every encoded vector follows this layout.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "distance_to_downtown",
    "transit_score",
    "crime_rate",
    "amenities_count",
    "family_type_encoded",
    "people_count",
    "rooms_required",
    "has_children",
    "parking_required",
    "furnished_type_encoded",
];

/// Household composition category.
///
/// Unknown label strings map to `Bachelor` (code 0). This is a documented
/// best-effort policy, not an error: existing callers rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FamilyType {
    /// Code 0
    Bachelor,
    /// Code 1
    Executive,
    /// Code 2
    Family,
}

impl FamilyType {
    /// Returns the fixed integer code used in feature vectors.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            FamilyType::Bachelor => 0,
            FamilyType::Executive => 1,
            FamilyType::Family => 2,
        }
    }

    /// Parses a label string; unknown labels fall back to `Bachelor`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "Executive" => FamilyType::Executive,
            "Family" => FamilyType::Family,
            _ => FamilyType::Bachelor,
        }
    }

    /// Returns the canonical label string.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FamilyType::Bachelor => "Bachelor",
            FamilyType::Executive => "Executive",
            FamilyType::Family => "Family",
        }
    }
}

/// Furnishing level category.
///
/// Same fallback policy as [`FamilyType`]: unknown labels map to
/// `Unfurnished` (code 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FurnishedType {
    /// Code 0
    #[serde(rename = "Unfurnished")]
    Unfurnished,
    /// Code 1
    #[serde(rename = "Semi-Furnished")]
    SemiFurnished,
    /// Code 2
    #[serde(rename = "Fully-Furnished")]
    FullyFurnished,
}

impl FurnishedType {
    /// Returns the fixed integer code used in feature vectors.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            FurnishedType::Unfurnished => 0,
            FurnishedType::SemiFurnished => 1,
            FurnishedType::FullyFurnished => 2,
        }
    }

    /// Parses a label string; unknown labels fall back to `Unfurnished`.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label {
            "Semi-Furnished" => FurnishedType::SemiFurnished,
            "Fully-Furnished" => FurnishedType::FullyFurnished,
            _ => FurnishedType::Unfurnished,
        }
    }

    /// Returns the canonical label string.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FurnishedType::Unfurnished => "Unfurnished",
            FurnishedType::SemiFurnished => "Semi-Furnished",
            FurnishedType::FullyFurnished => "Fully-Furnished",
        }
    }
}

/// The canonical 10-dimensional encoded representation of a rental query
/// or dataset row.
///
/// Invariant: always exactly [`FEATURE_COUNT`] values in the
/// [`FEATURE_NAMES`] order, with categories encoded via [`FamilyType`] and
/// [`FurnishedType`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    /// Wraps an already-encoded value array.
    #[must_use]
    pub fn new(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Builds a feature vector from a slice.
    ///
    /// # Errors
    ///
    /// Returns a dimension mismatch error unless the slice has exactly
    /// [`FEATURE_COUNT`] elements.
    pub fn from_slice(values: &[f32]) -> Result<Self> {
        let arr: [f32; FEATURE_COUNT] =
            values
                .try_into()
                .map_err(|_| ArrendarError::DimensionMismatch {
                    expected: FEATURE_COUNT.to_string(),
                    actual: values.len().to_string(),
                })?;
        Ok(Self(arr))
    }

    /// Returns the encoded values in canonical order.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Raw caller input for one rent estimate.
///
/// Category fields carry free-form label strings; [`RentQuery::encode`]
/// applies the fixed integer mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentQuery {
    /// Distance to downtown in kilometers.
    pub distance: f32,
    /// Transit accessibility score.
    pub transit_score: f32,
    /// Crime rate indicator.
    pub crime_rate: f32,
    /// Number of nearby amenities.
    pub amenities: f32,
    /// Household category label (e.g. "Bachelor", "Family").
    pub family_type: String,
    /// Number of occupants.
    pub people_count: u32,
    /// Number of rooms required.
    pub rooms_required: u32,
    /// Whether children live in the household.
    pub has_children: bool,
    /// Whether a parking spot is required.
    pub parking_required: bool,
    /// Furnishing label (e.g. "Semi-Furnished").
    pub furnished_type: String,
}

impl RentQuery {
    /// Validates the numeric fields and encodes the query into the
    /// canonical feature order.
    ///
    /// Unknown category labels are not rejected; they encode as 0.
    ///
    /// # Errors
    ///
    /// Returns [`ArrendarError::InvalidInput`] if a numeric field is
    /// non-finite or negative.
    pub fn encode(&self) -> Result<FeatureVector> {
        check_numeric("distance", self.distance)?;
        check_numeric("transit_score", self.transit_score)?;
        check_numeric("crime_rate", self.crime_rate)?;
        check_numeric("amenities", self.amenities)?;

        Ok(FeatureVector([
            self.distance,
            self.transit_score,
            self.crime_rate,
            self.amenities,
            f32::from(FamilyType::from_label(&self.family_type).code()),
            self.people_count as f32,
            self.rooms_required as f32,
            f32::from(u8::from(self.has_children)),
            f32::from(u8::from(self.parking_required)),
            f32::from(FurnishedType::from_label(&self.furnished_type).code()),
        ]))
    }
}

fn check_numeric(field: &str, value: f32) -> Result<()> {
    if !value.is_finite() {
        return Err(ArrendarError::invalid_input(field, value, "a finite number"));
    }
    if value < 0.0 {
        return Err(ArrendarError::invalid_input(field, value, ">= 0"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_query() -> RentQuery {
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

    #[test]
    fn test_family_type_codes() {
        assert_eq!(FamilyType::Bachelor.code(), 0);
        assert_eq!(FamilyType::Executive.code(), 1);
        assert_eq!(FamilyType::Family.code(), 2);
    }

    #[test]
    fn test_furnished_type_codes() {
        assert_eq!(FurnishedType::Unfurnished.code(), 0);
        assert_eq!(FurnishedType::SemiFurnished.code(), 1);
        assert_eq!(FurnishedType::FullyFurnished.code(), 2);
    }

    #[test]
    fn test_unknown_family_label_defaults_to_bachelor() {
        assert_eq!(FamilyType::from_label("Student"), FamilyType::Bachelor);
        assert_eq!(
            FamilyType::from_label("Student").code(),
            FamilyType::Bachelor.code()
        );
    }

    #[test]
    fn test_unknown_furnished_label_defaults_to_unfurnished() {
        assert_eq!(
            FurnishedType::from_label("Partially"),
            FurnishedType::Unfurnished
        );
    }

    #[test]
    fn test_label_round_trip() {
        for ft in [FamilyType::Bachelor, FamilyType::Executive, FamilyType::Family] {
            assert_eq!(FamilyType::from_label(ft.label()), ft);
        }
        for ft in [
            FurnishedType::Unfurnished,
            FurnishedType::SemiFurnished,
            FurnishedType::FullyFurnished,
        ] {
            assert_eq!(FurnishedType::from_label(ft.label()), ft);
        }
    }

    #[test]
    fn test_encode_canonical_order() {
        let encoded = sample_query().encode().expect("encode should succeed");
        assert_eq!(
            encoded.as_slice(),
            &[5.0, 70.0, 3.2, 10.0, 2.0, 4.0, 3.0, 1.0, 1.0, 2.0]
        );
    }

    #[test]
    fn test_encode_rejects_nan() {
        let mut query = sample_query();
        query.crime_rate = f32::NAN;
        let err = query.encode().expect_err("NaN should be rejected");
        assert!(matches!(err, ArrendarError::InvalidInput { .. }));
        assert!(err.to_string().contains("crime_rate"));
    }

    #[test]
    fn test_encode_rejects_negative_distance() {
        let mut query = sample_query();
        query.distance = -1.0;
        let err = query.encode().expect_err("negative distance rejected");
        assert!(err.to_string().contains("distance"));
    }

    #[test]
    fn test_feature_vector_from_slice_wrong_length() {
        let result = FeatureVector::from_slice(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            result,
            Err(ArrendarError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_feature_names_length() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_furnished_type_serde_labels() {
        let json = serde_json::to_string(&FurnishedType::SemiFurnished).expect("serialize");
        assert_eq!(json, "\"Semi-Furnished\"");
    }
}
