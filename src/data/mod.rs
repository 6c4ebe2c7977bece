//! Neighborhood dataset: records, encoded views, and CSV loading.
//!
//! The dataset is loaded once at process start and treated as read-only
//! for the lifetime of every query. A load failure surfaces as
//! [`ArrendarError::DataAccess`] at the boundary; query-time code never
//! touches the filesystem.

use crate::encoding::{FamilyType, FeatureVector, FurnishedType, FEATURE_COUNT};
use crate::error::{ArrendarError, Result};
use crate::primitives::{Matrix, Vector};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One dataset row: a neighborhood name, its raw attributes, and the
/// observed average rent. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodRecord {
    /// Neighborhood name (no uniqueness constraint).
    pub name: String,
    /// Distance to downtown in kilometers.
    pub distance_to_downtown: f32,
    /// Transit accessibility score.
    pub transit_score: f32,
    /// Crime rate indicator.
    pub crime_rate: f32,
    /// Number of nearby amenities.
    pub amenities_count: f32,
    /// Household category.
    pub family_type: FamilyType,
    /// Number of occupants.
    pub people_count: u32,
    /// Number of rooms.
    pub rooms_required: u32,
    /// Whether children live in the household.
    pub has_children: bool,
    /// Whether a parking spot is included.
    pub parking_required: bool,
    /// Furnishing level.
    pub furnished_type: FurnishedType,
    /// Observed average monthly rent.
    pub average_rent: f32,
}

impl NeighborhoodRecord {
    /// Encodes the record into the canonical feature order, using the
    /// same categorical codes the model was trained with.
    #[must_use]
    pub fn features(&self) -> FeatureVector {
        FeatureVector::new([
            self.distance_to_downtown,
            self.transit_score,
            self.crime_rate,
            self.amenities_count,
            f32::from(self.family_type.code()),
            self.people_count as f32,
            self.rooms_required as f32,
            f32::from(u8::from(self.has_children)),
            f32::from(u8::from(self.parking_required)),
            f32::from(self.furnished_type.code()),
        ])
    }
}

/// Ordered, read-only collection of neighborhood records.
///
/// # Examples
///
/// ```no_run
/// use arrendar::data::NeighborhoodDataset;
///
/// let dataset = NeighborhoodDataset::from_csv("data/rental_data.csv").unwrap();
/// assert!(!dataset.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct NeighborhoodDataset {
    records: Vec<NeighborhoodRecord>,
}

/// CSV header names, in the order the original dataset ships them.
const COLUMNS: [&str; 12] = [
    "Neighborhood",
    "Distance_to_Downtown",
    "Transit_Score",
    "Crime_Rate",
    "Amenities_Count",
    "Family_Type",
    "People_Count",
    "Rooms_Required",
    "Has_Children",
    "Parking_Required",
    "Furnished_Type",
    "Average_Rent",
];

impl NeighborhoodDataset {
    /// Creates a dataset from in-memory records.
    #[must_use]
    pub fn new(records: Vec<NeighborhoodRecord>) -> Self {
        Self { records }
    }

    /// Loads a dataset from a CSV file.
    ///
    /// Expects the twelve named columns of the rental dataset; column
    /// order in the file does not matter. Unknown category labels encode
    /// as 0 rather than failing the load.
    ///
    /// # Errors
    ///
    /// Returns [`ArrendarError::DataAccess`] if the file cannot be opened,
    /// a required column is missing, or a row fails to parse or carries a
    /// non-finite number. The message carries the 1-based line number of
    /// the offending row.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| ArrendarError::data_access(&display, format!("failed to open CSV: {e}")))?;

        let headers = reader
            .headers()
            .map_err(|e| {
                ArrendarError::data_access(&display, format!("failed to read headers: {e}"))
            })?
            .clone();

        let mut col_indices = [0usize; COLUMNS.len()];
        for (i, name) in COLUMNS.iter().enumerate() {
            col_indices[i] = headers.iter().position(|h| h == *name).ok_or_else(|| {
                ArrendarError::data_access(&display, format!("missing column '{name}'"))
            })?;
        }

        let mut records = Vec::new();
        let mut line = 2; // 1-based, after the header row

        for result in reader.records() {
            let row = result.map_err(|e| {
                ArrendarError::data_access(&display, format!("line {line}: failed to read row: {e}"))
            })?;

            let field = |i: usize| -> Result<&str> {
                row.get(col_indices[i]).ok_or_else(|| {
                    ArrendarError::data_access(
                        &display,
                        format!("line {line}: missing field '{}'", COLUMNS[i]),
                    )
                })
            };
            let numeric = |i: usize| -> Result<f32> {
                let raw = field(i)?;
                let value = raw.trim().parse::<f32>().map_err(|_| {
                    ArrendarError::data_access(
                        &display,
                        format!("line {line}: '{raw}' is not a number for '{}'", COLUMNS[i]),
                    )
                })?;
                // f32::parse accepts "NaN" and "inf"; non-finite values
                // would poison distances and split search downstream.
                if !value.is_finite() {
                    return Err(ArrendarError::data_access(
                        &display,
                        format!("line {line}: '{raw}' is not finite for '{}'", COLUMNS[i]),
                    ));
                }
                Ok(value)
            };

            records.push(NeighborhoodRecord {
                name: field(0)?.to_string(),
                distance_to_downtown: numeric(1)?,
                transit_score: numeric(2)?,
                crime_rate: numeric(3)?,
                amenities_count: numeric(4)?,
                family_type: FamilyType::from_label(field(5)?.trim()),
                people_count: numeric(6)? as u32,
                rooms_required: numeric(7)? as u32,
                has_children: numeric(8)? != 0.0,
                parking_required: numeric(9)? != 0.0,
                furnished_type: FurnishedType::from_label(field(10)?.trim()),
                average_rent: numeric(11)?,
            });
            line += 1;
        }

        Ok(Self { records })
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the records in load order.
    #[must_use]
    pub fn records(&self) -> &[NeighborhoodRecord] {
        &self.records
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, NeighborhoodRecord> {
        self.records.iter()
    }

    /// Encodes every record into an (n_rows × 10) feature matrix.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty dataset.
    pub fn to_matrix(&self) -> Result<Matrix<f32>> {
        if self.records.is_empty() {
            return Err(ArrendarError::empty_input("neighborhood dataset"));
        }

        let mut data = Vec::with_capacity(self.records.len() * FEATURE_COUNT);
        for record in &self.records {
            data.extend_from_slice(record.features().as_slice());
        }

        Matrix::from_vec(self.records.len(), FEATURE_COUNT, data)
            .map_err(|e| ArrendarError::Other(e.to_string()))
    }

    /// Returns the observed rents in load order.
    #[must_use]
    pub fn rents(&self) -> Vector<f32> {
        Vector::from_vec(self.records.iter().map(|r| r.average_rent).collect())
    }
}
