//! # Prompt Module
//!
//! Assembles the grounded prompt sent to the language model.
//!
//! The prompt is plain text with fixed section headings. Sections whose input
//! was not supplied are left out; inputs that failed (no matching context,
//! dataset not loaded) are rendered as their error message so the model knows
//! the grounding is missing.

use crate::retrieval::RetrievedContext;
use crate::suggest::{HistoricalRecord, SuggestionResult};
use crate::CropwiseError;
use std::fmt::Write;

const PREAMBLE: &str = "You are an agricultural advisor helping a farmer choose what to plant. \
Answer using the records below. If the records do not cover the question, say so.";

const CLOSING: &str = "Give a short, practical recommendation: which crop to plant, \
why, and what to change on the plot.";

/// Builder for the advisory prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvisoryPrompt {
    question: String,
    farm_records: Option<String>,
    market_records: Option<String>,
    guidance: Option<String>,
}

impl AdvisoryPrompt {
    /// Start a prompt for the farmer's question.
    #[must_use]
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into().trim().to_string(),
            ..Self::default()
        }
    }

    /// Attach facts retrieved from the farmer knowledge base.
    #[must_use]
    pub fn with_farm_records(mut self, context: &Result<RetrievedContext<'_>, CropwiseError>) -> Self {
        self.farm_records = Some(context_text(context));
        self
    }

    /// Attach facts retrieved from the market knowledge base.
    #[must_use]
    pub fn with_market_records(
        mut self,
        context: &Result<RetrievedContext<'_>, CropwiseError>,
    ) -> Self {
        self.market_records = Some(context_text(context));
        self
    }

    /// Attach the nearest-neighbor crop guidance.
    #[must_use]
    pub fn with_guidance(mut self, suggestion: &Result<SuggestionResult, CropwiseError>) -> Self {
        self.guidance = Some(match suggestion {
            Ok(result) => guidance_text(result),
            Err(e) => e.to_string(),
        });
        self
    }

    /// The farmer's question as given.
    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Render the full prompt text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(PREAMBLE);
        out.push_str("\n\nFarmer's question:\n");
        out.push_str(&self.question);
        out.push('\n');

        for (heading, body) in [
            ("Farm records", &self.farm_records),
            ("Market records", &self.market_records),
            ("Nearest-neighbor guidance", &self.guidance),
        ] {
            if let Some(body) = body {
                let _ = write!(out, "\n{heading}:\n{body}\n");
            }
        }

        out.push('\n');
        out.push_str(CLOSING);
        out
    }
}

fn context_text(context: &Result<RetrievedContext<'_>, CropwiseError>) -> String {
    match context {
        Ok(ctx) => ctx.render(),
        Err(e) => e.to_string(),
    }
}

fn describe(record: &HistoricalRecord) -> String {
    let crop = record.crop_type.as_deref().unwrap_or("unknown crop");
    let mut out = crop.to_string();
    let mut details = Vec::new();
    if let Some(y) = record.crop_yield {
        details.push(format!("yield {y} tons"));
    }
    if let Some(s) = record.sustainability_score {
        details.push(format!("sustainability {s}"));
    }
    if !details.is_empty() {
        let _ = write!(out, " ({})", details.join(", "));
    }
    out
}

fn guidance_text(result: &SuggestionResult) -> String {
    if let Some(record) = result.sustainable_crop.as_ref().filter(|_| result.found_sustainable) {
        return format!("Most sustainable crop for these conditions: {}.", describe(record));
    }

    let Some(record) = result
        .alternative_yield_crop
        .as_ref()
        .filter(|_| result.found_alternative)
    else {
        return "No crop suggestion available.".to_string();
    };

    let mut out = format!(
        "No sufficiently sustainable match was found. Highest-yield crop among similar farms: {}.",
        describe(record)
    );
    if let Some(changes) = &result.condition_changes {
        let deltas: Vec<String> = changes
            .iter()
            .map(|(feature, delta)| format!("{feature} {delta:+.2}"))
            .collect();
        let _ = write!(out, "\nCondition changes to match it: {}.", deltas.join(", "));
    }
    out
}
