//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::PlotArgs;
use crate::config::CropwiseConfig;
use crate::model::ModelClient;
use crate::startup::Advisor;
use cropwise_core::{AdvisoryPrompt, CropwiseError, DatasetKind, retrieve_context};

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Print an error for the user (stdout JSON in JSON mode, stderr otherwise).
pub fn report_error(error: &CropwiseError, json_mode: bool) {
    if json_mode {
        print_json(&serde_json::json!({
            "error": error.kind(),
            "message": error.to_string(),
        }));
    } else {
        eprintln!("{}", error);
    }
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show knowledge-base sizes and suggester state.
pub fn cmd_status(advisor: &Advisor, json_mode: bool) -> Result<(), CropwiseError> {
    let suggester = advisor.suggester();
    let indexed = suggester.reference().map_or(0, |r| r.len());

    if json_mode {
        print_json(&serde_json::json!({
            "farmer_entries": advisor.farmer_kb().len(),
            "market_entries": advisor.market_kb().len(),
            "suggester_loaded": suggester.is_loaded(),
            "indexed_records": indexed,
            "neighbors": suggester.neighbors(),
        }));
        return Ok(());
    }

    println!("Cropwise Status");
    println!("===============");
    println!("Farmer KB:       {} entries", advisor.farmer_kb().len());
    println!("Market KB:       {} entries", advisor.market_kb().len());
    if suggester.is_loaded() {
        println!(
            "Suggestions:     enabled ({} records, {} neighbors)",
            indexed,
            suggester.neighbors()
        );
    } else {
        println!("Suggestions:     disabled (dataset not loaded)");
    }

    Ok(())
}

// =============================================================================
// RETRIEVE COMMAND
// =============================================================================

/// Rank facts from one knowledge base against a query.
pub fn cmd_retrieve(
    advisor: &Advisor,
    json_mode: bool,
    kb: &str,
    query: &str,
    top_n: usize,
) -> Result<(), CropwiseError> {
    let kind = DatasetKind::parse(kb)?;
    let context = retrieve_context(query, advisor.knowledge_base(kind), top_n)?;

    if json_mode {
        print_json(&serde_json::json!({
            "kb": kind,
            "query": query,
            "results": context.entries(),
        }));
    } else {
        println!("{}", context.render());
    }

    Ok(())
}

// =============================================================================
// SUGGEST COMMAND
// =============================================================================

/// Suggest a crop for the given plot conditions.
pub fn cmd_suggest(advisor: &Advisor, json_mode: bool, plot: &PlotArgs) -> Result<(), CropwiseError> {
    let features = plot.features()?.ok_or_else(|| {
        CropwiseError::InvalidInput(
            "suggest needs --ph, --moisture, --temperature and --rainfall".to_string(),
        )
    })?;

    let result = advisor
        .suggester()
        .find_crop_suggestion_with_guidance(&features)?;

    if json_mode {
        print_json(&serde_json::to_value(&result).map_err(|e| {
            CropwiseError::Unexpected(format!("cannot serialize suggestion: {}", e))
        })?);
        return Ok(());
    }

    println!("Crop Suggestion");
    println!("===============");
    if let Some(record) = result.sustainable_crop.as_ref().filter(|_| result.found_sustainable) {
        println!(
            "Most sustainable: {}",
            record.crop_type.as_deref().unwrap_or("unknown")
        );
    }
    if let Some(record) = result
        .alternative_yield_crop
        .as_ref()
        .filter(|_| result.found_alternative)
    {
        println!(
            "Highest-yield alternative: {} (row {})",
            record.crop_type.as_deref().unwrap_or("unknown"),
            record.row
        );
        if let Some(y) = record.crop_yield {
            println!("  Yield:          {} tons", y);
        }
        if let Some(s) = record.sustainability_score {
            println!("  Sustainability: {}", s);
        }
    }
    if let Some(changes) = &result.condition_changes {
        println!();
        println!("Condition changes:");
        for (feature, delta) in changes {
            println!("  {:<14} {:+.2}", feature.column(), delta);
        }
    }

    Ok(())
}

// =============================================================================
// PROMPT / ASK COMMANDS
// =============================================================================

/// Assemble the grounded prompt for a question.
///
/// Retrieval and suggestion failures are folded into the prompt text; only
/// invalid plot arguments are an error.
pub fn build_prompt(
    advisor: &Advisor,
    config: &CropwiseConfig,
    query: &str,
    plot: &PlotArgs,
) -> Result<AdvisoryPrompt, CropwiseError> {
    let top_n = config.retrieval.top_n;
    let mut prompt = AdvisoryPrompt::new(query)
        .with_farm_records(&retrieve_context(query, advisor.farmer_kb(), top_n))
        .with_market_records(&retrieve_context(query, advisor.market_kb(), top_n));

    if let Some(features) = plot.features()? {
        prompt = prompt.with_guidance(
            &advisor
                .suggester()
                .find_crop_suggestion_with_guidance(&features),
        );
    }

    Ok(prompt)
}

/// Print the grounded prompt without calling the model.
pub fn cmd_prompt(
    advisor: &Advisor,
    config: &CropwiseConfig,
    json_mode: bool,
    query: &str,
    plot: &PlotArgs,
) -> Result<(), CropwiseError> {
    let prompt = build_prompt(advisor, config, query, plot)?.render();

    if json_mode {
        print_json(&serde_json::json!({ "prompt": prompt }));
    } else {
        println!("{}", prompt);
    }

    Ok(())
}

/// Build the grounded prompt and query the model.
pub fn cmd_ask(
    advisor: &Advisor,
    config: &CropwiseConfig,
    json_mode: bool,
    query: &str,
    plot: &PlotArgs,
) -> Result<(), CropwiseError> {
    let prompt = build_prompt(advisor, config, query, plot)?.render();
    let client = ModelClient::from_config(&config.model);
    let advice = client.query(&prompt)?;

    if json_mode {
        print_json(&serde_json::json!({
            "question": query,
            "advice": advice,
        }));
    } else {
        println!("{}", advice);
    }

    Ok(())
}
