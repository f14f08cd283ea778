//! # Runtime Configuration
//!
//! Optional TOML file read at startup. Every field has a default, so an
//! absent file or section means "use the defaults"; command-line flags
//! override whatever the file says.
//!
//! ```toml
//! database = "cooccur.redb"
//!
//! [csv]
//! item_column = "itemDescription"
//! key_columns = ["Member_number", "Date"]
//! delimiter = ","
//! date_column = "Date"
//! date_format = "%d-%m-%Y"
//!
//! [embedding]
//! rank = 20
//!
//! [query]
//! top_k = 5
//! depth = 2
//! ```

use cooccur_core::CooccurError;
use cooccur_core::primitives::{DEFAULT_EMBEDDING_RANK, DEFAULT_RELATED_DEPTH, DEFAULT_TOP_K};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default database file.
pub const DEFAULT_DATABASE: &str = "cooccur.redb";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: PathBuf,
    pub csv: CsvConfig,
    pub embedding: EmbeddingConfig,
    pub query: QueryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            csv: CsvConfig::default(),
            embedding: EmbeddingConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

/// Layout of the purchase CSV.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Column holding the item name.
    pub item_column: String,
    /// Columns whose values together identify one purchase.
    pub key_columns: Vec<String>,
    /// Field delimiter (single ASCII character).
    pub delimiter: char,
    /// Key column holding a date, rewritten as `%Y%m%d` before keying.
    /// Empty disables the rewrite.
    pub date_column: String,
    /// chrono format of the values in `date_column`.
    pub date_format: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            item_column: "itemDescription".to_string(),
            key_columns: vec!["Member_number".to_string(), "Date".to_string()],
            delimiter: ',',
            date_column: "Date".to_string(),
            date_format: "%d-%m-%Y".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub rank: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            rank: DEFAULT_EMBEDDING_RANK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub top_k: usize,
    pub depth: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            depth: DEFAULT_RELATED_DEPTH,
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, CooccurError> {
        let config: Self = toml::from_str(toml).map_err(|e| {
            CooccurError::DeserializationError(format!("Failed to parse TOML: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration file at `path`, or the defaults if it does not
    /// exist.
    pub fn load(path: &Path) -> Result<Self, CooccurError> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            CooccurError::IoError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        tracing::debug!("Loaded config from {:?}", path);
        Self::from_toml_str(&contents)
    }

    /// Reject settings the CSV reader cannot use.
    pub fn validate(&self) -> Result<(), CooccurError> {
        if !self.csv.delimiter.is_ascii() {
            return Err(CooccurError::DeserializationError(format!(
                "CSV delimiter {:?} is not a single ASCII character",
                self.csv.delimiter
            )));
        }
        if self.csv.item_column.is_empty() {
            return Err(CooccurError::DeserializationError(
                "csv.item_column must not be empty".to_string(),
            ));
        }
        if self.csv.key_columns.is_empty() {
            return Err(CooccurError::DeserializationError(
                "csv.key_columns must name at least one column".to_string(),
            ));
        }
        if !self.csv.date_column.is_empty() && self.csv.date_format.is_empty() {
            return Err(CooccurError::DeserializationError(
                "csv.date_format must not be empty when csv.date_column is set".to_string(),
            ));
        }
        Ok(())
    }
}
