//! # Engine Primitives
//!
//! Hardcoded runtime constants for the cooccur engine.
//!
//! These are compiled into the binary and are immutable at runtime. The app
//! layer may override the query defaults through its configuration file.

/// Magic bytes for the snapshot binary format header.
///
/// - File Header = Magic Bytes ("COOC") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"COOC";

/// Current serialization format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

/// Default number of latent dimensions kept by the embedder.
pub const DEFAULT_EMBEDDING_RANK: usize = 20;

/// Default result length for ranking and recommendation queries.
pub const DEFAULT_TOP_K: usize = 5;

/// Default hop limit for related-item traversal.
pub const DEFAULT_RELATED_DEPTH: usize = 2;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length in bytes for an item name.
pub const MAX_ITEM_NAME_LENGTH: usize = 256;

/// Maximum number of distinct items in one ingested transaction.
///
/// `add_transaction` expands a basket into every unordered pair, so a basket
/// of `n` items costs `n * (n - 1) / 2` updates. The ingestor rejects
/// baskets above this size.
pub const MAX_TRANSACTION_ITEMS: usize = 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"COOC");
    }

    #[test]
    fn transaction_limit_bounds_pair_expansion() {
        let pairs = MAX_TRANSACTION_ITEMS * (MAX_TRANSACTION_ITEMS - 1) / 2;
        assert!(pairs < 1_000_000);
    }
}
