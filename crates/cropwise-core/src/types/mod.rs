//! # Core Type Definitions
//!
//! This module contains the shared types for the Cropwise advisory engine:
//! - Dataset identity (`DatasetKind`)
//! - Plot conditions (`Feature`, `FeatureVector`)
//! - Knowledge snippets (`Fact`)
//! - Error types (`CropwiseError`)

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// DATASET IDENTITY
// =============================================================================

/// Which of the two static datasets a table or knowledge base came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Historical farming outcomes (soil, weather, yield, sustainability).
    Farmer,
    /// Market conditions (prices, demand, supply).
    Market,
}

impl DatasetKind {
    /// Both kinds, in startup order.
    pub const ALL: [Self; 2] = [Self::Farmer, Self::Market];

    /// Lower-case name used on the command line and in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Farmer => "farmer",
            Self::Market => "market",
        }
    }

    /// Parse a kind from its command-line name.
    pub fn parse(s: &str) -> Result<Self, CropwiseError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "farmer" => Ok(Self::Farmer),
            "market" => Ok(Self::Market),
            other => Err(CropwiseError::InvalidInput(format!(
                "unknown dataset '{other}', expected 'farmer' or 'market'"
            ))),
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// PLOT CONDITIONS
// =============================================================================

/// One of the four tracked plot conditions.
///
/// The declaration order is the canonical feature order; `Ord` follows it so
/// `BTreeMap<Feature, _>` iterates in that order too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "Soil_pH")]
    SoilPh,
    #[serde(rename = "Soil_Moisture")]
    SoilMoisture,
    #[serde(rename = "Temperature_C")]
    Temperature,
    #[serde(rename = "Rainfall_mm")]
    Rainfall,
}

impl Feature {
    /// All features in canonical order.
    pub const ALL: [Self; 4] = [
        Self::SoilPh,
        Self::SoilMoisture,
        Self::Temperature,
        Self::Rainfall,
    ];

    /// Dataset column name for this feature.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::SoilPh => "Soil_pH",
            Self::SoilMoisture => "Soil_Moisture",
            Self::Temperature => "Temperature_C",
            Self::Rainfall => "Rainfall_mm",
        }
    }

    /// Position of this feature inside a `FeatureVector`.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::SoilPh => 0,
            Self::SoilMoisture => 1,
            Self::Temperature => 2,
            Self::Rainfall => 3,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Conditions of a farm plot: soil pH, soil moisture, temperature, rainfall.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; 4]);

impl FeatureVector {
    /// Build a vector from the four conditions in canonical order.
    #[must_use]
    pub const fn new(soil_ph: f64, soil_moisture: f64, temperature: f64, rainfall: f64) -> Self {
        Self([soil_ph, soil_moisture, temperature, rainfall])
    }

    /// Value of a single feature.
    #[must_use]
    pub const fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    /// Iterate `(feature, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.into_iter().map(|f| (f, self.get(f)))
    }

    /// Squared Euclidean distance to another vector.
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    /// True if every component is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

// =============================================================================
// FACT
// =============================================================================

/// A human-readable summary of one dataset row.
///
/// Facts are produced once by the knowledge-base builder and never mutated.
/// A row whose tracked fields are all missing yields an empty fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fact(String);

impl Fact {
    /// Wrap already-rendered text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The fact text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the source row had no usable fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Cropwise system.
///
/// Every failure is caught where it happens and returned as one of these
/// variants; nothing escapes as a panic. The `Display` text of the advisory
/// variants is what end users see.
#[derive(Debug, Error)]
pub enum CropwiseError {
    /// A dataset file does not exist at the configured path.
    #[error("Dataset file not found: {0}")]
    DatasetNotFound(String),

    /// The knowledge base being searched holds no facts.
    #[error("No knowledge base available.")]
    EmptyKnowledgeBase,

    /// The query contains no word characters.
    #[error("No valid query words found.")]
    NoQueryTerms,

    /// No fact shares a word with the query.
    #[error("No relevant context found in the knowledge base.")]
    NoRelevantContext,

    /// The reference table for crop suggestions was never loaded.
    #[error("Dataset not loaded.")]
    DatasetNotLoaded,

    /// The model executable could not be found.
    #[error("Model is not configured correctly: executable not found at {0}")]
    ExecutableNotFound(String),

    /// The model process exited with a non-zero status.
    #[error("Model failed to process the request (exit code {code:?}). {stderr}")]
    ModelFailed { code: Option<i32>, stderr: String },

    /// The model process ran past its deadline and was killed.
    #[error("The request to the model timed out after {0} ms.")]
    ModelTimeout(u64),

    /// The model process succeeded but printed nothing.
    #[error("Model did not return advice.")]
    EmptyModelOutput,

    /// Any other failure while talking to the model.
    #[error("An unexpected error occurred while getting advice: {0}")]
    Unexpected(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A delimited file could not be parsed.
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Caller-supplied input or configuration is invalid.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CropwiseError {
    /// Stable snake_case tag for programmatic callers (JSON output, logs).
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DatasetNotFound(_) => "dataset_not_found",
            Self::EmptyKnowledgeBase => "empty_knowledge_base",
            Self::NoQueryTerms => "no_query_terms",
            Self::NoRelevantContext => "no_relevant_context",
            Self::DatasetNotLoaded => "dataset_not_loaded",
            Self::ExecutableNotFound(_) => "executable_not_found",
            Self::ModelFailed { .. } => "model_failed",
            Self::ModelTimeout(_) => "model_timeout",
            Self::EmptyModelOutput => "empty_model_output",
            Self::Unexpected(_) => "unexpected",
            Self::IoError(_) => "io_error",
            Self::CsvError(_) => "csv_error",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn feature_order_is_canonical() {
        let mut map = BTreeMap::new();
        map.insert(Feature::Rainfall, 1.0);
        map.insert(Feature::SoilPh, 2.0);
        map.insert(Feature::Temperature, 3.0);
        map.insert(Feature::SoilMoisture, 4.0);

        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, Feature::ALL.to_vec());
    }

    #[test]
    fn feature_serializes_as_column_name() {
        let json = serde_json::to_string(&Feature::SoilPh).expect("serialize");
        assert_eq!(json, "\"Soil_pH\"");
    }

    #[test]
    fn feature_vector_accessors() {
        let v = FeatureVector::new(6.5, 30.0, 25.0, 120.0);
        assert_eq!(v.get(Feature::SoilPh), 6.5);
        assert_eq!(v.get(Feature::Rainfall), 120.0);
        assert_eq!(v.iter().count(), 4);
    }

    #[test]
    fn distance_squared_is_symmetric() {
        let a = FeatureVector::new(1.0, 2.0, 3.0, 4.0);
        let b = FeatureVector::new(2.0, 2.0, 3.0, 6.0);
        assert_eq!(a.distance_squared(&b), 5.0);
        assert_eq!(b.distance_squared(&a), 5.0);
    }

    #[test]
    fn dataset_kind_parse() {
        assert_eq!(DatasetKind::parse("Farmer").expect("parse"), DatasetKind::Farmer);
        assert_eq!(DatasetKind::parse("market").expect("parse"), DatasetKind::Market);
        assert!(matches!(
            DatasetKind::parse("weather"),
            Err(CropwiseError::InvalidInput(_))
        ));
    }

    #[test]
    fn advisory_messages_match_user_text() {
        assert_eq!(
            CropwiseError::NoQueryTerms.to_string(),
            "No valid query words found."
        );
        assert_eq!(
            CropwiseError::DatasetNotLoaded.to_string(),
            "Dataset not loaded."
        );
        assert_eq!(CropwiseError::ModelTimeout(500).kind(), "model_timeout");
    }
}
