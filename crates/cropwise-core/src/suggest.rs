//! # Suggestion Module
//!
//! Nearest-neighbor crop guidance over the historical farmer dataset.
//!
//! ## Algorithm
//!
//! 1. Take the K nearest historical records to the input conditions.
//! 2. Rank them by (sustainability desc, yield desc); the first is the
//!    best-sustainability candidate.
//! 3. The sustainability gate rejects that candidate (see
//!    [`ACCEPT_SUSTAINABLE_MATCH`]), so the alternative branch always runs.
//! 4. The alternative is the neighbor with the highest yield.
//! 5. For each feature, report `round(alternative - input, 2)`.

use crate::dataset::Table;
use crate::neighbors::{Neighbor, NeighborIndex};
use crate::primitives::{
    CROP_TYPE_COLUMN, DEFAULT_NEIGHBORS, DELTA_DECIMALS, SUSTAINABILITY_COLUMN, YIELD_COLUMN,
};
use crate::{CropwiseError, Feature, FeatureVector};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Whether the best-sustainability neighbor may be returned as the answer.
///
/// Hardcoded to `false`: every suggestion reports the highest-yield
/// alternative and the sustainable branch is unreachable. This matches the
/// advisor's established behavior and is kept until the acceptance rule is
/// defined.
pub const ACCEPT_SUSTAINABLE_MATCH: bool = false;

// =============================================================================
// REFERENCE DATA
// =============================================================================

/// One historical row usable for suggestions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalRecord {
    /// Row number in the source table (0-based, header excluded).
    pub row: usize,
    /// Crop grown, if recorded.
    pub crop_type: Option<String>,
    /// Plot conditions.
    pub features: FeatureVector,
    /// Sustainability outcome, if recorded and numeric.
    pub sustainability_score: Option<f64>,
    /// Yield in tons, if recorded and numeric.
    pub crop_yield: Option<f64>,
    /// Every non-missing cell of the row, keyed by column name.
    pub columns: BTreeMap<String, String>,
}

/// Historical records plus the neighbor index over their features.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    records: Vec<HistoricalRecord>,
    index: NeighborIndex,
    skipped_rows: usize,
}

impl ReferenceTable {
    /// Build the reference data from the farmer table.
    ///
    /// Rows whose four feature values are not all finite numbers cannot be
    /// placed in the index and are skipped (see `skipped_rows`).
    ///
    /// # Errors
    /// - `InvalidInput` if a feature or outcome column is absent
    /// - `DatasetNotLoaded` if no row is usable
    pub fn from_table(table: &Table) -> Result<Self, CropwiseError> {
        let require = |name: &str| {
            table.column_index(name).ok_or_else(|| {
                CropwiseError::InvalidInput(format!("reference table is missing column '{name}'"))
            })
        };

        let feature_columns = [
            require(Feature::SoilPh.column())?,
            require(Feature::SoilMoisture.column())?,
            require(Feature::Temperature.column())?,
            require(Feature::Rainfall.column())?,
        ];
        let sustainability_column = require(SUSTAINABILITY_COLUMN)?;
        let yield_column = require(YIELD_COLUMN)?;
        let crop_column = table.column_index(CROP_TYPE_COLUMN);

        let mut records = Vec::with_capacity(table.len());
        let mut skipped_rows = 0;

        for row in 0..table.len() {
            let mut values = [0.0_f64; 4];
            let mut usable = true;
            for (slot, column) in values.iter_mut().zip(feature_columns) {
                match parse_number(table.cell(row, column)) {
                    Some(v) => *slot = v,
                    None => {
                        usable = false;
                        break;
                    }
                }
            }
            if !usable {
                skipped_rows += 1;
                continue;
            }

            let columns = table
                .headers()
                .iter()
                .enumerate()
                .filter_map(|(col, name)| {
                    table
                        .cell(row, col)
                        .map(|cell| (name.clone(), cell.to_string()))
                })
                .collect();

            records.push(HistoricalRecord {
                row,
                crop_type: crop_column
                    .and_then(|c| table.cell(row, c))
                    .map(str::to_string),
                features: FeatureVector(values),
                sustainability_score: parse_number(table.cell(row, sustainability_column)),
                crop_yield: parse_number(table.cell(row, yield_column)),
                columns,
            });
        }

        if records.is_empty() {
            return Err(CropwiseError::DatasetNotLoaded);
        }

        let index = NeighborIndex::new(records.iter().map(|r| r.features).collect());
        Ok(Self {
            records,
            index,
            skipped_rows,
        })
    }

    /// Indexed records in table order.
    #[must_use]
    pub fn records(&self) -> &[HistoricalRecord] {
        &self.records
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false for a successfully built table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows left out of the index because a feature was missing or invalid.
    #[must_use]
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    fn nearest(&self, input: &FeatureVector, k: usize) -> Vec<(&HistoricalRecord, Neighbor)> {
        self.index
            .nearest(input, k)
            .into_iter()
            .filter_map(|n| self.records.get(n.index).map(|r| (r, n)))
            .collect()
    }
}

fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell.and_then(|c| c.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

// =============================================================================
// SUGGESTION RESULT
// =============================================================================

/// Outcome of a crop suggestion.
///
/// Exactly one of the sustainable/alternative branches is populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionResult {
    /// The conditions that were asked about.
    pub input: BTreeMap<Feature, f64>,
    /// True if a sustainable match was accepted.
    pub found_sustainable: bool,
    /// The accepted sustainable match.
    pub sustainable_crop: Option<HistoricalRecord>,
    /// True if the highest-yield alternative was reported.
    pub found_alternative: bool,
    /// The highest-yield neighbor.
    pub alternative_yield_crop: Option<HistoricalRecord>,
    /// Per-feature change needed to reach the alternative's conditions.
    pub condition_changes: Option<BTreeMap<Feature, f64>>,
}

// =============================================================================
// CROP SUGGESTER
// =============================================================================

/// Crop suggestion engine over an optional reference table.
///
/// An unloaded suggester answers every request with `DatasetNotLoaded`.
#[derive(Debug, Clone)]
pub struct CropSuggester {
    reference: Option<ReferenceTable>,
    neighbors: usize,
}

impl Default for CropSuggester {
    fn default() -> Self {
        Self::unloaded()
    }
}

impl CropSuggester {
    /// A suggester with no reference data.
    #[must_use]
    pub fn unloaded() -> Self {
        Self {
            reference: None,
            neighbors: DEFAULT_NEIGHBORS,
        }
    }

    /// A suggester over loaded reference data.
    #[must_use]
    pub fn new(reference: ReferenceTable) -> Self {
        Self {
            reference: Some(reference),
            neighbors: DEFAULT_NEIGHBORS,
        }
    }

    /// Override how many neighbors are consulted (minimum 1).
    #[must_use]
    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors.max(1);
        self
    }

    /// Number of neighbors consulted per request.
    #[must_use]
    pub fn neighbors(&self) -> usize {
        self.neighbors
    }

    /// True if reference data is present.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.reference.is_some()
    }

    /// The reference data, if loaded.
    #[must_use]
    pub fn reference(&self) -> Option<&ReferenceTable> {
        self.reference.as_ref()
    }

    /// Suggest a crop for the given plot conditions.
    ///
    /// # Errors
    /// `DatasetNotLoaded` if no reference data is present.
    pub fn find_crop_suggestion_with_guidance(
        &self,
        input: &FeatureVector,
    ) -> Result<SuggestionResult, CropwiseError> {
        let reference = self
            .reference
            .as_ref()
            .ok_or(CropwiseError::DatasetNotLoaded)?;

        let neighbors = reference.nearest(input, self.neighbors);
        let records: Vec<&HistoricalRecord> = neighbors.iter().map(|(r, _)| *r).collect();

        let mut result = SuggestionResult {
            input: input.iter().collect(),
            found_sustainable: false,
            sustainable_crop: None,
            found_alternative: false,
            alternative_yield_crop: None,
            condition_changes: None,
        };

        let best_sustainable = best_sustainability(&records);

        if ACCEPT_SUSTAINABLE_MATCH && best_sustainable.is_some() {
            result.found_sustainable = true;
            result.sustainable_crop = best_sustainable.cloned();
            return Ok(result);
        }

        // Non-empty: the reference table always has at least one record.
        let alternative = highest_yield(&records).ok_or(CropwiseError::DatasetNotLoaded)?;

        result.condition_changes = Some(
            Feature::ALL
                .into_iter()
                .map(|f| {
                    let delta = alternative.features.get(f) - input.get(f);
                    (f, round_to(delta, DELTA_DECIMALS))
                })
                .collect(),
        );
        result.found_alternative = true;
        result.alternative_yield_crop = Some(alternative.clone());

        Ok(result)
    }
}

/// Descending order with missing values last.
fn desc_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn best_sustainability<'a>(records: &[&'a HistoricalRecord]) -> Option<&'a HistoricalRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| {
        desc_missing_last(a.sustainability_score, b.sustainability_score)
            .then_with(|| desc_missing_last(a.crop_yield, b.crop_yield))
    });
    ranked.first().copied()
}

/// First record holding the maximum yield; falls back to the nearest record
/// when no yield is recorded.
fn highest_yield<'a>(records: &[&'a HistoricalRecord]) -> Option<&'a HistoricalRecord> {
    let mut best: Option<(&HistoricalRecord, f64)> = None;
    for record in records.iter().copied() {
        let Some(y) = record.crop_yield else {
            continue;
        };
        if best.is_none_or(|(_, top)| y > top) {
            best = Some((record, y));
        }
    }
    best.map(|(r, _)| r).or_else(|| records.first().copied())
}

/// Round to `decimals` places; exact halves go to the even digit.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
