//! # cooccur - Co-purchase Analysis CLI
//!
//! The main binary for the cooccur co-purchase engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                apps/cooccur (THE BINARY)             │
//! │                                                      │
//! │  ┌─────────────┐   ┌─────────────┐   ┌────────────┐  │
//! │  │    CLI      │   │ CSV loader  │   │   Config   │  │
//! │  │   (clap)    │   │   (csv)     │   │   (toml)   │  │
//! │  └──────┬──────┘   └──────┬──────┘   └─────┬──────┘  │
//! │         └─────────────────┼────────────────┘         │
//! │                           ▼                          │
//! │                  ┌────────────────┐                  │
//! │                  │  cooccur-core  │                  │
//! │                  │  (THE LOGIC)   │                  │
//! │                  └────────────────┘                  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! cooccur build data/groceries.csv
//! cooccur top-with "whole milk" -k 10
//! cooccur rec-basket "whole milk,yogurt" --rank 20
//! ```

use clap::Parser;
use cooccur::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // Initialize tracing — COOCCUR_LOG_FORMAT=json enables machine-parseable output.
    // Logs go to stderr so command output on stdout stays clean.
    let log_format = std::env::var("COOCCUR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let default_filter = if cli.verbose {
        "cooccur=debug"
    } else {
        "cooccur=info"
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

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
