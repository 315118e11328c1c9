//! # Startup
//!
//! The one-time startup phase: load both datasets, build both knowledge
//! bases, index the farmer table for crop suggestions.
//!
//! The resulting [`Advisor`] is immutable. Commands borrow it; nothing is
//! rebuilt or mutated after `Advisor::load` returns.

use crate::config::CropwiseConfig;
use cropwise_core::{
    CropSuggester, CropwiseError, DatasetKind, KnowledgeBase, ReferenceTable, Table,
};
use std::path::Path;

/// Load a dataset, logging and substituting an empty table on failure.
pub fn load_or_empty(kind: DatasetKind, path: &Path) -> Table {
    match Table::load(path) {
        Ok(table) => {
            tracing::info!(dataset = %kind, rows = table.len(), "Loaded {}", path.display());
            table
        }
        Err(CropwiseError::DatasetNotFound(p)) => {
            tracing::error!(dataset = %kind, "Dataset file not found: {}", p);
            Table::empty()
        }
        Err(e) => {
            tracing::error!(dataset = %kind, "Failed to load {}: {}", path.display(), e);
            Table::empty()
        }
    }
}

/// Everything built at startup.
#[derive(Debug, Clone)]
pub struct Advisor {
    farmer_kb: KnowledgeBase,
    market_kb: KnowledgeBase,
    suggester: CropSuggester,
}

impl Advisor {
    /// Run the startup phase against the configured files.
    pub fn load(config: &CropwiseConfig) -> Self {
        let farmer = load_or_empty(DatasetKind::Farmer, &config.data.farmer_path);
        let market = load_or_empty(DatasetKind::Market, &config.data.market_path);
        Self::from_tables(&farmer, &market, config.suggestion.neighbors)
    }

    /// Build from tables already in memory.
    pub fn from_tables(farmer: &Table, market: &Table, neighbors: usize) -> Self {
        let farmer_kb = KnowledgeBase::build(DatasetKind::Farmer, farmer);
        let market_kb = KnowledgeBase::build(DatasetKind::Market, market);
        tracing::info!(
            farmer_entries = farmer_kb.len(),
            market_entries = market_kb.len(),
            "Knowledge bases loaded"
        );

        let suggester = if farmer.is_empty() {
            tracing::warn!("Farmer dataset is empty; crop suggestions are disabled");
            CropSuggester::unloaded()
        } else {
            match ReferenceTable::from_table(farmer) {
                Ok(reference) => {
                    if reference.skipped_rows() > 0 {
                        tracing::warn!(
                            skipped = reference.skipped_rows(),
                            "Farmer rows without numeric soil/weather values were left out of the index"
                        );
                    }
                    tracing::info!(records = reference.len(), "Crop suggestion index built");
                    CropSuggester::new(reference)
                }
                Err(e) => {
                    tracing::error!("Crop suggestions are disabled: {}", e);
                    CropSuggester::unloaded()
                }
            }
        }
        .with_neighbors(neighbors);

        Self {
            farmer_kb,
            market_kb,
            suggester,
        }
    }

    /// Facts from the farmer dataset.
    #[must_use]
    pub fn farmer_kb(&self) -> &KnowledgeBase {
        &self.farmer_kb
    }

    /// Facts from the market dataset.
    #[must_use]
    pub fn market_kb(&self) -> &KnowledgeBase {
        &self.market_kb
    }

    /// Knowledge base by dataset kind.
    #[must_use]
    pub fn knowledge_base(&self, kind: DatasetKind) -> &KnowledgeBase {
        match kind {
            DatasetKind::Farmer => &self.farmer_kb,
            DatasetKind::Market => &self.market_kb,
        }
    }

    /// The crop suggester (possibly unloaded).
    #[must_use]
    pub fn suggester(&self) -> &CropSuggester {
        &self.suggester
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tables_give_unloaded_advisor() {
        let advisor = Advisor::from_tables(&Table::empty(), &Table::empty(), 10);
        assert!(advisor.farmer_kb().is_empty());
        assert!(advisor.market_kb().is_empty());
        assert!(!advisor.suggester().is_loaded());
    }

    #[test]
    fn knowledge_base_lookup_by_kind() {
        let farmer = Table::from_rows(["Crop_Type"], [vec!["Wheat"]]);
        let advisor = Advisor::from_tables(&farmer, &Table::empty(), 10);
        assert_eq!(advisor.knowledge_base(DatasetKind::Farmer).len(), 1);
        assert_eq!(advisor.knowledge_base(DatasetKind::Market).len(), 0);
        // Crop_Type alone cannot be indexed.
        assert!(!advisor.suggester().is_loaded());
    }
}
