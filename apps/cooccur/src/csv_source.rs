//! # CSV Purchase Rows
//!
//! Reads `(purchase key, item)` rows from a CSV file with a header row.
//! The purchase key is the values of the configured key columns joined with
//! `|`; the item is the trimmed value of the item column. Rows with an empty
//! item are skipped.
//!
//! A key column named by `date_column` is parsed with `date_format` and
//! rewritten as `%Y%m%d`, so `1-1-2015` and `01-01-2015` key the same
//! purchase.

use crate::config::CsvConfig;
use chrono::NaiveDate;
use cooccur_core::CooccurError;
use std::path::Path;

/// Maximum CSV size accepted by `build` (1 GB).
pub const MAX_CSV_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Separator between key column values in a purchase key.
const KEY_SEPARATOR: &str = "|";

/// Canonical form of a date inside a purchase key.
const KEY_DATE_FORMAT: &str = "%Y%m%d";

/// Rows read from one CSV source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurchaseRows {
    /// `(purchase key, item)` in file order.
    pub rows: Vec<(String, String)>,
    /// Records dropped because the item cell was empty.
    pub skipped: usize,
}

/// Read purchase rows from a CSV file.
pub fn read_purchase_rows(path: &Path, config: &CsvConfig) -> Result<PurchaseRows, CooccurError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CooccurError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > MAX_CSV_FILE_SIZE {
        return Err(CooccurError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_CSV_FILE_SIZE
        )));
    }

    let file = std::fs::File::open(path).map_err(|e| {
        CooccurError::IoError(format!("Failed to open CSV '{}': {}", path.display(), e))
    })?;
    read_purchase_rows_from(file, config)
}

/// Read purchase rows from any reader.
pub fn read_purchase_rows_from<R: std::io::Read>(
    reader: R,
    config: &CsvConfig,
) -> Result<PurchaseRows, CooccurError> {
    if !config.delimiter.is_ascii() {
        return Err(CooccurError::DeserializationError(format!(
            "CSV delimiter {:?} is not a single ASCII character",
            config.delimiter
        )));
    }
    let delimiter = config.delimiter as u8;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| CooccurError::DeserializationError(format!("Failed to read headers: {}", e)))?
        .clone();

    let column_index = |name: &str| {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            CooccurError::DeserializationError(format!(
                "Column '{}' not found. Available columns: {:?}",
                name,
                headers.iter().collect::<Vec<_>>()
            ))
        })
    };

    let item_idx = column_index(&config.item_column)?;
    let key_idx = config
        .key_columns
        .iter()
        .map(|name| column_index(name))
        .collect::<Result<Vec<_>, _>>()?;

    let date_idx = if config.date_column.is_empty() {
        None
    } else {
        config
            .key_columns
            .iter()
            .position(|name| *name == config.date_column)
    };

    let mut out = PurchaseRows::default();
    for (line, result) in reader.records().enumerate() {
        // Line 1 is the header.
        let row = line.saturating_add(2);
        let record = result.map_err(|e| {
            CooccurError::DeserializationError(format!("Failed to read row {}: {}", row, e))
        })?;

        let item = record.get(item_idx).unwrap_or_default();
        if item.is_empty() {
            out.skipped = out.skipped.saturating_add(1);
            continue;
        }

        let mut parts = key_idx
            .iter()
            .map(|&i| record.get(i).unwrap_or_default().to_string())
            .collect::<Vec<_>>();
        if let Some(part) = date_idx.and_then(|i| parts.get_mut(i)) {
            let normalized = normalize_date(part, &config.date_format).map_err(|e| {
                CooccurError::DeserializationError(format!(
                    "Row {}: cannot parse {} '{}' as '{}': {}",
                    row, config.date_column, part, config.date_format, e
                ))
            })?;
            *part = normalized;
        }
        let key = parts.join(KEY_SEPARATOR);

        out.rows.push((key, item.to_string()));
    }

    tracing::debug!(
        "Read {} purchase rows ({} skipped)",
        out.rows.len(),
        out.skipped
    );
    Ok(out)
}

fn normalize_date(value: &str, format: &str) -> Result<String, chrono::ParseError> {
    NaiveDate::parse_from_str(value, format).map(|date| date.format(KEY_DATE_FORMAT).to_string())
}
