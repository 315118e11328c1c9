//! # Cropwise - Crop Advisor
//!
//! The main binary for the Cropwise advisory assistant.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   apps/cropwise (THE BINARY)                 │
//! │                                                              │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────┐  │
//! │  │    CLI      │    │   Startup   │    │  Model Process  │  │
//! │  │   (clap)    │    │ (CSV → KB)  │    │  (subprocess)   │  │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬────────┘  │
//! │         │                  │                    │           │
//! │         └──────────────────┼────────────────────┘           │
//! │                            ▼                                │
//! │                    ┌───────────────┐                        │
//! │                    │ cropwise-core │                        │
//! │                    │  (THE LOGIC)  │                        │
//! │                    └───────────────┘                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! cropwise status
//! cropwise retrieve --kb market -Q "wheat price"
//! cropwise suggest --ph 6.5 --moisture 30 --temperature 22 --rainfall 150
//! cropwise ask -Q "What should I plant?" --ph 6.5 --moisture 30 --temperature 22 --rainfall 150
//! ```

use clap::Parser;
use cropwise::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // CROPWISE_LOG_FORMAT=json switches to machine-parseable output.
    // Logs go to stderr so command output on stdout stays clean.
    let log_format = std::env::var("CROPWISE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "cropwise=debug"
    } else {
        "cropwise=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Errors are already reported to the user by `execute`.
    if let Err(e) = cli::execute(cli) {
        tracing::debug!(kind = e.kind(), "Command failed");
        std::process::exit(1);
    }
}

/// Print the Cropwise startup banner.
fn print_banner() {
    eprintln!(
        r#"
   ___                          _
  / __|_ _ ___ _ __ __ __ _(_)___ ___
 | (__| '_/ _ \ '_ \\ V  V / (_-</ -_)
  \___|_| \___/ .__/ \_/\_/|_/__/\___|
              |_|
  Crop Advisor v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
