//! # Advisory Primitives
//!
//! Hardcoded constants for the Cropwise CORE.
//!
//! These are compiled into the binary and immutable at runtime. The app layer
//! may override the tunable ones (`DEFAULT_TOP_N`, `DEFAULT_NEIGHBORS`) through
//! configuration, but the CORE never reads configuration itself.

/// Number of facts returned by context retrieval when the caller does not say.
pub const DEFAULT_TOP_N: usize = 3;

/// Number of historical records consulted per crop suggestion.
pub const DEFAULT_NEIGHBORS: usize = 10;

/// Separator placed between retrieved facts in rendered context.
pub const CONTEXT_SEPARATOR: &str = "\n---\n";

/// Decimal places kept in condition deltas.
pub const DELTA_DECIMALS: i32 = 2;

// =============================================================================
// DATASET COLUMNS
// =============================================================================

/// Column holding the crop name in the farmer dataset.
pub const CROP_TYPE_COLUMN: &str = "Crop_Type";

/// Column holding the sustainability outcome in the farmer dataset.
pub const SUSTAINABILITY_COLUMN: &str = "Sustainability_Score";

/// Column holding the yield outcome in the farmer dataset.
pub const YIELD_COLUMN: &str = "Crop_Yield_ton";

/// Cell values treated as missing when a table is loaded.
///
/// Empty cells are always missing; these are the conventional NA spellings
/// found in exported spreadsheets.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns true if a trimmed cell value counts as missing.
#[must_use]
pub fn is_missing(cell: &str) -> bool {
    cell.is_empty() || MISSING_MARKERS.contains(&cell)
}
