//! # Knowledge Module
//!
//! Turns dataset rows into facts for keyword retrieval.
//!
//! Each dataset kind has a fixed, ordered list of field descriptors. A row
//! becomes one fact by rendering every descriptor whose column is present and
//! non-missing as `"<Label>: <value><suffix>"` and joining the parts with a
//! single space. Rows with no usable field still produce an (empty) fact so
//! that fact positions line up with table rows.

use crate::dataset::Table;
use crate::{DatasetKind, Fact};

/// How one column is rendered inside a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Column name in the source table.
    pub column: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Text appended directly after the value (unit and punctuation).
    pub suffix: &'static str,
}

impl FieldSpec {
    const fn new(column: &'static str, label: &'static str, suffix: &'static str) -> Self {
        Self {
            column,
            label,
            suffix,
        }
    }

    fn render(&self, value: &str) -> String {
        format!("{}: {}{}", self.label, value, self.suffix)
    }
}

/// Fact layout for the farmer dataset.
pub const FARMER_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Crop_Type", "Crop", "."),
    FieldSpec::new("Soil_pH", "Soil pH", ","),
    FieldSpec::new("Soil_Moisture", "Moisture", "%,"),
    FieldSpec::new("Temperature_C", "Temperature", "°C,"),
    FieldSpec::new("Rainfall_mm", "Rainfall", " mm,"),
    FieldSpec::new("Crop_Yield_ton", "Yield", " tons."),
];

/// Fact layout for the market dataset.
pub const MARKET_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("Product", "Crop", "."),
    FieldSpec::new("Market_Price_per_ton", "Market Price", ","),
    FieldSpec::new("Demand_Index", "Demand Index", ","),
    FieldSpec::new("Supply_Index", "Supply Index", ","),
    FieldSpec::new("Competitor_Price_per_ton", "Competitor Price", ","),
    FieldSpec::new("Weather_Impact_Score", "Weather Impact Score", ","),
    FieldSpec::new("Seasonal_Factor", "Seasonal Factor", "."),
];

/// Descriptor list for a dataset kind.
#[must_use]
pub const fn fields_for(kind: DatasetKind) -> &'static [FieldSpec] {
    match kind {
        DatasetKind::Farmer => FARMER_FIELDS,
        DatasetKind::Market => MARKET_FIELDS,
    }
}

/// Ordered, read-only collection of facts for one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeBase {
    kind: DatasetKind,
    facts: Vec<Fact>,
}

impl KnowledgeBase {
    /// An empty knowledge base of the given kind.
    #[must_use]
    pub fn empty(kind: DatasetKind) -> Self {
        Self {
            kind,
            facts: Vec::new(),
        }
    }

    /// Wrap facts that were rendered elsewhere.
    #[must_use]
    pub fn from_facts(kind: DatasetKind, facts: Vec<Fact>) -> Self {
        Self { kind, facts }
    }

    /// Build the knowledge base for `kind` from a loaded table.
    ///
    /// Uses the kind's fixed descriptor list. An empty table gives an empty
    /// knowledge base.
    #[must_use]
    pub fn build(kind: DatasetKind, table: &Table) -> Self {
        Self::build_with(kind, table, fields_for(kind))
    }

    /// Build with an explicit descriptor list.
    #[must_use]
    pub fn build_with(kind: DatasetKind, table: &Table, fields: &[FieldSpec]) -> Self {
        // Resolve columns once; absent columns are skipped for every row.
        let columns: Vec<(usize, &FieldSpec)> = fields
            .iter()
            .filter_map(|field| table.column_index(field.column).map(|idx| (idx, field)))
            .collect();

        let facts = table
            .rows()
            .map(|row| {
                let parts: Vec<String> = columns
                    .iter()
                    .filter_map(|(idx, field)| {
                        row.get(*idx)
                            .and_then(Option::as_deref)
                            .map(|value| field.render(value))
                    })
                    .collect();
                Fact::new(parts.join(" "))
            })
            .collect();

        Self { kind, facts }
    }

    /// Which dataset these facts describe.
    #[must_use]
    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    /// Facts in row order.
    #[must_use]
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Number of facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// True if there are no facts at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}
