//! # Cropwise CLI Module
//!
//! This module implements the CLI interface for Cropwise.
//!
//! ## Available Commands
//!
//! - `status` - Show knowledge-base sizes and suggester state
//! - `retrieve` - Rank facts from one knowledge base against a query
//! - `suggest` - Nearest-neighbor crop guidance for plot conditions
//! - `prompt` - Print the grounded prompt without calling the model
//! - `ask` - Build the grounded prompt and query the model

mod commands;

use crate::config::load_config;
use crate::startup::Advisor;
use clap::{Args, Parser, Subcommand};
use cropwise_core::{CropwiseError, FeatureVector};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Cropwise - crop advisor
///
/// Recommends crops from historical farm outcomes and market data, grounded
/// answers come from a local language model.
#[derive(Parser, Debug)]
#[command(name = "cropwise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML configuration file
    #[arg(short = 'c', long, global = true, default_value = "cropwise.toml")]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Plot conditions. Either all four or none.
#[derive(Args, Debug, Clone, Default)]
pub struct PlotArgs {
    /// Soil pH
    #[arg(long)]
    pub ph: Option<f64>,

    /// Soil moisture (%)
    #[arg(long)]
    pub moisture: Option<f64>,

    /// Temperature (°C)
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Rainfall (mm)
    #[arg(long)]
    pub rainfall: Option<f64>,
}

impl PlotArgs {
    /// The feature vector, `None` if no condition was given.
    ///
    /// # Errors
    /// `InvalidInput` if only some conditions are given or one is not finite.
    pub fn features(&self) -> Result<Option<FeatureVector>, CropwiseError> {
        match (self.ph, self.moisture, self.temperature, self.rainfall) {
            (None, None, None, None) => Ok(None),
            (Some(ph), Some(moisture), Some(temperature), Some(rainfall)) => {
                let v = FeatureVector::new(ph, moisture, temperature, rainfall);
                if v.is_finite() {
                    Ok(Some(v))
                } else {
                    Err(CropwiseError::InvalidInput(
                        "plot conditions must be finite numbers".to_string(),
                    ))
                }
            }
            _ => Err(CropwiseError::InvalidInput(
                "give all of --ph, --moisture, --temperature and --rainfall, or none".to_string(),
            )),
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show knowledge-base sizes and whether suggestions are available
    Status,

    /// Rank facts from a knowledge base against a query
    Retrieve {
        /// Knowledge base to search (farmer, market)
        #[arg(short, long, default_value = "farmer")]
        kb: String,

        /// Free-text query
        #[arg(short = 'Q', long)]
        query: String,

        /// Number of facts to return (defaults to retrieval.top_n)
        #[arg(short = 'n', long)]
        top_n: Option<usize>,
    },

    /// Suggest a crop for the given plot conditions
    Suggest {
        #[command(flatten)]
        plot: PlotArgs,
    },

    /// Print the grounded prompt without calling the model
    Prompt {
        /// The farmer's question
        #[arg(short = 'Q', long)]
        query: String,

        #[command(flatten)]
        plot: PlotArgs,
    },

    /// Ask the model a grounded question
    Ask {
        /// The farmer's question
        #[arg(short = 'Q', long)]
        query: String,

        #[command(flatten)]
        plot: PlotArgs,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
///
/// Every failure, configuration errors included, is reported once through
/// [`report_error`] before being returned.
pub fn execute(cli: Cli) -> Result<(), CropwiseError> {
    let json_mode = cli.json_mode;
    let result = run(cli);
    if let Err(e) = &result {
        report_error(e, json_mode);
    }
    result
}

fn run(cli: Cli) -> Result<(), CropwiseError> {
    let json_mode = cli.json_mode;
    let config = load_config(&cli.config)?;
    config.validate()?;

    let advisor = Advisor::load(&config);

    match cli.command {
        Some(Commands::Status) | None => cmd_status(&advisor, json_mode),
        Some(Commands::Retrieve { kb, query, top_n }) => cmd_retrieve(
            &advisor,
            json_mode,
            &kb,
            &query,
            top_n.unwrap_or(config.retrieval.top_n),
        ),
        Some(Commands::Suggest { plot }) => cmd_suggest(&advisor, json_mode, &plot),
        Some(Commands::Prompt { query, plot }) => {
            cmd_prompt(&advisor, &config, json_mode, &query, &plot)
        }
        Some(Commands::Ask { query, plot }) => {
            cmd_ask(&advisor, &config, json_mode, &query, &plot)
        }
    }
}
