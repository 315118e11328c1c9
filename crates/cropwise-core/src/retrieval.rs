//! # Retrieval Module
//!
//! Keyword-overlap context retrieval over a knowledge base.
//!
//! ## Scoring
//!
//! 1. Lower-case the query, split on non-word characters, keep the unique
//!    non-empty tokens.
//! 2. Score each fact by the number of query tokens it also contains.
//! 3. Drop zero scores, sort by score descending (stable: ties keep fact order).
//! 4. Keep the first `top_n`.
//!
//! Retrieval only borrows the knowledge base, so any number of callers can
//! run it concurrently.

use crate::knowledge::KnowledgeBase;
use crate::primitives::CONTEXT_SEPARATOR;
use crate::{CropwiseError, Fact};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A fact selected by retrieval, with its overlap score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredFact<'a> {
    /// Number of distinct query tokens found in the fact.
    pub score: usize,
    /// Position of the fact in its knowledge base.
    pub index: usize,
    /// The fact itself.
    pub fact: &'a Fact,
}

/// Facts chosen for a query, best first.
///
/// Never empty: a query with no matches yields `NoRelevantContext` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievedContext<'a> {
    entries: Vec<ScoredFact<'a>>,
}

impl<'a> RetrievedContext<'a> {
    /// Selected facts, best first.
    #[must_use]
    pub fn entries(&self) -> &[ScoredFact<'a>] {
        &self.entries
    }

    /// Number of selected facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a value returned by `retrieve_context`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Facts joined with the context separator.
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.fact.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }
}

impl fmt::Display for RetrievedContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Split text into its set of lower-cased word tokens.
///
/// A word character is any Unicode alphanumeric or `_`; everything else
/// separates tokens.
#[must_use]
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Return the `top_n` facts from `kb` sharing the most words with `query`.
///
/// # Errors
/// - `NoQueryTerms` if the query has no word tokens (checked first)
/// - `EmptyKnowledgeBase` if `kb` holds no facts
/// - `NoRelevantContext` if no fact shares a token with the query, or
///   `top_n` is zero
pub fn retrieve_context<'a>(
    query: &str,
    kb: &'a KnowledgeBase,
    top_n: usize,
) -> Result<RetrievedContext<'a>, CropwiseError> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        return Err(CropwiseError::NoQueryTerms);
    }

    if kb.is_empty() {
        return Err(CropwiseError::EmptyKnowledgeBase);
    }

    let mut scored: Vec<ScoredFact<'a>> = kb
        .facts()
        .iter()
        .enumerate()
        .filter_map(|(index, fact)| {
            let score = tokenize(fact.as_str())
                .intersection(&query_tokens)
                .count();
            (score > 0).then_some(ScoredFact { score, index, fact })
        })
        .collect();

    // sort_by is stable, so equal scores keep knowledge-base order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(top_n);

    if scored.is_empty() {
        return Err(CropwiseError::NoRelevantContext);
    }

    Ok(RetrievedContext { entries: scored })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatasetKind;

    fn kb(facts: &[&str]) -> KnowledgeBase {
        KnowledgeBase::from_facts(
            DatasetKind::Farmer,
            facts.iter().map(|f| Fact::new(*f)).collect(),
        )
    }

    #[test]
    fn tokenize_splits_on_non_word() {
        let tokens = tokenize("Soil pH: 6.5, Temperature: 25°C");
        let expected: BTreeSet<String> = ["soil", "ph", "6", "5", "temperature", "25", "c"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn tokenize_keeps_underscores() {
        let tokens = tokenize("Crop_Type??");
        assert!(tokens.contains("crop_type"));
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn punctuation_query_rejected_before_kb_check() {
        let empty = kb(&[]);
        assert!(matches!(
            retrieve_context("?!, ...", &empty, 3),
            Err(CropwiseError::NoQueryTerms)
        ));
    }

    #[test]
    fn empty_kb_rejected() {
        let empty = kb(&[]);
        assert!(matches!(
            retrieve_context("wheat", &empty, 3),
            Err(CropwiseError::EmptyKnowledgeBase)
        ));
    }

    #[test]
    fn ranks_by_overlap() {
        let kb = kb(&["Crop: Wheat. Soil pH: 6.5,", "Crop: Rice. Soil pH: 5.5,"]);
        let ctx = retrieve_context("wheat soil", &kb, 3).expect("context");

        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.entries()[0].score, 2);
        assert_eq!(ctx.entries()[1].score, 1);
        assert_eq!(
            ctx.render(),
            "Crop: Wheat. Soil pH: 6.5,\n---\nCrop: Rice. Soil pH: 5.5,"
        );
    }

    #[test]
    fn ties_keep_original_order() {
        let kb = kb(&["Rice paddy", "Wheat field", "Rice terrace"]);
        let ctx = retrieve_context("rice", &kb, 3).expect("context");
        let indices: Vec<_> = ctx.entries().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn truncates_to_top_n() {
        let kb = kb(&["a b c", "a b", "a", "a"]);
        let ctx = retrieve_context("a b c", &kb, 2).expect("context");
        let indices: Vec<_> = ctx.entries().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn no_overlap_is_reported() {
        let kb = kb(&["Crop: Wheat.", ""]);
        assert!(matches!(
            retrieve_context("banana", &kb, 3),
            Err(CropwiseError::NoRelevantContext)
        ));
    }

    #[test]
    fn zero_top_n_yields_no_context() {
        let kb = kb(&["Crop: Wheat."]);
        assert!(matches!(
            retrieve_context("wheat", &kb, 0),
            Err(CropwiseError::NoRelevantContext)
        ));
    }

    #[test]
    fn query_case_is_ignored() {
        let kb = kb(&["Crop: Wheat."]);
        let ctx = retrieve_context("WHEAT", &kb, 3).expect("context");
        assert_eq!(ctx.to_string(), "Crop: Wheat.");
    }
}
