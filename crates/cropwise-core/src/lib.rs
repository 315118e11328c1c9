//! # cropwise-core
//!
//! The deterministic advisory engine for Cropwise - THE LOGIC.
//!
//! Cropwise recommends crops by combining two static datasets (historical
//! farm outcomes and market conditions) with a local language model. This
//! crate holds everything that does not touch the process environment:
//!
//! - `dataset`: CSV tables with missing-cell handling
//! - `knowledge`: row-to-fact rendering for keyword retrieval
//! - `retrieval`: keyword-overlap context ranking
//! - `neighbors` / `suggest`: nearest-neighbor crop guidance
//! - `prompt`: the grounded prompt handed to the model
//!
//! ## Architectural Constraints
//!
//! - NO async, NO network, NO subprocesses, NO logging
//! - Every structure is built once and only borrowed afterwards
//! - Failures are returned as `CropwiseError`, never as panics or sentinel
//!   strings

// =============================================================================
// MODULES
// =============================================================================

pub mod dataset;
pub mod knowledge;
pub mod neighbors;
pub mod primitives;
pub mod prompt;
pub mod retrieval;
pub mod suggest;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{CropwiseError, DatasetKind, Fact, Feature, FeatureVector};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use dataset::Table;
pub use knowledge::{FieldSpec, KnowledgeBase};
pub use neighbors::{Neighbor, NeighborIndex};
pub use prompt::AdvisoryPrompt;
pub use retrieval::{RetrievedContext, ScoredFact, retrieve_context, tokenize};
pub use suggest::{CropSuggester, HistoricalRecord, ReferenceTable, SuggestionResult};
