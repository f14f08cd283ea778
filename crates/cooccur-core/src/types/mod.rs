//! # Core Type Definitions
//!
//! This module contains the value types shared by every layer of the engine:
//! - Catalog identifiers (`ItemId`) and the canonical pair key (`PairKey`)
//! - Ranking outputs (`PairEntry`, `Neighbor`, `Recommendation`)
//! - The persisted relational form of a graph (`PersistedGraph`)
//! - Error types (`CooccurError`)
//!
//! ## Determinism Guarantees
//!
//! - Identifiers implement `Ord` so they can key `BTreeMap`/`BTreeSet`
//! - Counts use saturating `u64` arithmetic

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Dense catalog identifier, assigned in first-seen order starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    /// Position of this item in catalog order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Canonical key of an unordered item pair.
///
/// Packs `(low << 32) | high` with `low < high`. Packed keys sort by
/// `(low, high)`, which is the enumeration order of the pair store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey(u64);

impl PairKey {
    /// Canonicalize two ids into a pair key.
    ///
    /// Returns `None` for a self-pair; self-pairs are never weighted.
    #[must_use]
    pub fn new(a: ItemId, b: ItemId) -> Option<Self> {
        if a == b {
            return None;
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Some(Self((u64::from(low.0) << 32) | u64::from(high.0)))
    }

    /// The smaller id of the pair.
    #[must_use]
    pub const fn low(self) -> ItemId {
        ItemId((self.0 >> 32) as u32)
    }

    /// The larger id of the pair.
    #[must_use]
    pub const fn high(self) -> ItemId {
        ItemId((self.0 & 0xFFFF_FFFF) as u32)
    }

    /// Raw packed value.
    #[must_use]
    pub const fn packed(self) -> u64 {
        self.0
    }
}

// =============================================================================
// RANKING OUTPUTS
// =============================================================================

/// A stored edge resolved to item names, `name_a` being the lower catalog id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairEntry {
    pub name_a: String,
    pub name_b: String,
    pub count: u64,
}

/// A neighbor of some item together with the pair weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbor {
    pub name: String,
    pub count: u64,
}

/// A recommended item and its cosine similarity to the query profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    pub similarity: f64,
}

// =============================================================================
// PERSISTED FORM
// =============================================================================

/// One row of the `items` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedItem {
    pub id: u64,
    pub name: String,
}

/// One row of the `co_occurrences` relation. `item1_id < item2_id` when
/// produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedPair {
    pub item1_id: u64,
    pub item2_id: u64,
    pub count: u64,
}

/// The two-relation layout shared by the snapshot format and the redb store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedGraph {
    pub items: Vec<PersistedItem>,
    pub pairs: Vec<PersistedPair>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the cooccur engine.
///
/// Unknown item names and non-positive bounds are NOT errors: queries degrade
/// to empty results instead.
#[derive(Debug, Error)]
pub enum CooccurError {
    /// The embedder was handed a matrix that is not square.
    #[error("Matrix must be square, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },

    /// A restored pair references an id missing from the restored items.
    #[error("Unknown item id in persisted pair: {0}")]
    UnknownItemId(u64),

    /// An item name is empty or exceeds the length limit.
    #[error("Invalid item name")]
    InvalidItem,

    /// A transaction holds more distinct items than the ingestion limit.
    #[error("Transaction too large: {0} distinct items")]
    InvalidTransaction(usize),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_canonical() {
        let forward = PairKey::new(ItemId(3), ItemId(7)).expect("distinct");
        let backward = PairKey::new(ItemId(7), ItemId(3)).expect("distinct");
        assert_eq!(forward, backward);
        assert_eq!(forward.low(), ItemId(3));
        assert_eq!(forward.high(), ItemId(7));
    }

    #[test]
    fn pair_key_rejects_self_pair() {
        assert!(PairKey::new(ItemId(4), ItemId(4)).is_none());
    }

    #[test]
    fn pair_key_orders_by_low_then_high() {
        let a = PairKey::new(ItemId(0), ItemId(9)).expect("distinct");
        let b = PairKey::new(ItemId(1), ItemId(2)).expect("distinct");
        let c = PairKey::new(ItemId(1), ItemId(3)).expect("distinct");
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn pair_key_handles_large_ids() {
        let key = PairKey::new(ItemId(u32::MAX), ItemId(u32::MAX - 1)).expect("distinct");
        assert_eq!(key.low(), ItemId(u32::MAX - 1));
        assert_eq!(key.high(), ItemId(u32::MAX));
    }
}
