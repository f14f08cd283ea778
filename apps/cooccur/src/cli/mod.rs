//! # cooccur CLI Module
//!
//! This module implements the CLI interface for cooccur.
//!
//! ## Available Commands
//!
//! - `build` - Build the database from a purchase CSV
//! - `stats` - Show graph statistics
//! - `count` - Co-purchase count of two items
//! - `often` - Whether two items meet a minimum co-purchase count
//! - `top-with` - Most frequent partners of one item
//! - `top-pairs` - Most frequent pairs overall
//! - `related` - Items within a number of hops
//! - `rec-item` / `rec-basket` / `rec-customer` - Embedding recommendations
//! - `export` - Write a binary snapshot
//! - `import` - Load a binary snapshot into the database

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use cooccur_core::{CooccurError, Query};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// cooccur - co-purchase analysis
///
/// Counts which items are bought together, ranks them, and recommends
/// similar items from a low-rank embedding of the co-purchase matrix.
#[derive(Parser, Debug)]
#[command(name = "cooccur")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the redb database (overrides the config file)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Path to the TOML config file (defaults are used if it is absent)
    #[arg(short, long, global = true, default_value = "cooccur.toml")]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the database from a purchase CSV (replaces existing contents)
    Build {
        /// Path to the input CSV
        input: PathBuf,
    },

    /// Show graph statistics
    Stats,

    /// Co-purchase count of two items
    Count { a: String, b: String },

    /// Whether two items were bought together at least `min-count` times
    Often {
        a: String,
        b: String,

        /// Minimum co-purchase count
        #[arg(short, long, default_value = "2")]
        min_count: u64,
    },

    /// Items most often bought with one item
    TopWith {
        item: String,

        /// Number of results
        #[arg(short)]
        k: Option<usize>,
    },

    /// Most frequent item pairs
    TopPairs {
        /// Number of results
        #[arg(short)]
        k: Option<usize>,
    },

    /// Items reachable within a number of co-purchase hops
    Related {
        item: String,

        /// Traversal depth
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Items most similar to one item
    RecItem {
        item: String,

        /// Number of results
        #[arg(short)]
        k: Option<usize>,

        /// Embedding rank
        #[arg(short, long)]
        rank: Option<usize>,
    },

    /// Recommendations for a basket (comma-separated items)
    RecBasket {
        #[arg(value_delimiter = ',', required = true)]
        items: Vec<String>,

        /// Number of results
        #[arg(short)]
        k: Option<usize>,

        /// Embedding rank
        #[arg(short, long)]
        rank: Option<usize>,
    },

    /// Recommendations for a purchase history (comma-separated items)
    RecCustomer {
        #[arg(value_delimiter = ',', required = true)]
        purchased: Vec<String>,

        /// Number of results
        #[arg(short)]
        k: Option<usize>,

        /// Embedding rank
        #[arg(short, long)]
        rank: Option<usize>,
    },

    /// Export the graph as a binary snapshot
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import a binary snapshot (replaces existing contents)
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments, printing the command output.
pub fn execute(cli: Cli) -> Result<(), CooccurError> {
    let output = run(cli)?;
    println!("{}", output);
    Ok(())
}

/// Run a command and return its rendered output.
pub fn run(cli: Cli) -> Result<String, CooccurError> {
    let config = Config::load(&cli.config)?;
    let ctx = Context {
        database: cli.database.unwrap_or_else(|| config.database.clone()),
        json_mode: cli.json_mode,
        config,
    };
    let top_k = ctx.config.query.top_k;
    let rank = ctx.config.embedding.rank;

    match cli.command.unwrap_or(Commands::Stats) {
        Commands::Build { input } => cmd_build(&ctx, &input),
        Commands::Stats => cmd_query(&ctx, &Query::Stats, rank),
        Commands::Count { a, b } => cmd_query(&ctx, &Query::count(a, b), rank),
        Commands::Often { a, b, min_count } => {
            cmd_query(&ctx, &Query::OftenCopurchased { a, b, min_count }, rank)
        }
        Commands::TopWith { item, k } => cmd_query(
            &ctx,
            &Query::top_with_item(item, k.unwrap_or(top_k)),
            rank,
        ),
        Commands::TopPairs { k } => cmd_query(
            &ctx,
            &Query::TopPairs {
                limit: k.unwrap_or(top_k),
            },
            rank,
        ),
        Commands::Related { item, depth } => {
            let depth = depth.unwrap_or(ctx.config.query.depth);
            cmd_query(&ctx, &Query::related(item, depth), rank)
        }
        Commands::RecItem { item, k, rank: r } => cmd_query(
            &ctx,
            &Query::recommend_item(item, k.unwrap_or(top_k)),
            r.unwrap_or(rank),
        ),
        Commands::RecBasket { items, k, rank: r } => cmd_query(
            &ctx,
            &Query::RecommendBasket {
                items,
                k: k.unwrap_or(top_k),
            },
            r.unwrap_or(rank),
        ),
        Commands::RecCustomer {
            purchased,
            k,
            rank: r,
        } => cmd_query(
            &ctx,
            &Query::RecommendCustomer {
                purchased,
                k: k.unwrap_or(top_k),
            },
            r.unwrap_or(rank),
        ),
        Commands::Export { output } => cmd_export(&ctx, &output),
        Commands::Import { input } => cmd_import(&ctx, &input),
    }
}
