//! # cooccur
//!
//! Command-line front end for the co-purchase engine.
//!
//! - `cli`: clap commands over a redb database
//! - `config`: optional TOML configuration
//! - `csv_source`: purchase rows from CSV files

pub mod cli;
pub mod config;
pub mod csv_source;
