//! # Query Module
//!
//! Structured query types for engine interaction.
//!
//! - One variant per read operation the engine exposes
//! - Results are plain data, serializable for presentation layers
//! - Bounds of zero and unknown names degrade to empty results

use crate::stats::GraphStats;
use crate::{Neighbor, PairEntry, Recommendation};
use serde::Serialize;

/// Query operation types supported by a `Session`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Co-occurrence count of two items.
    Count { a: String, b: String },

    /// Most frequent co-purchases of one item.
    TopWithItem { item: String, limit: usize },

    /// Heaviest pairs overall.
    TopPairs { limit: usize },

    /// Whether two items meet a minimum co-purchase count.
    OftenCopurchased { a: String, b: String, min_count: u64 },

    /// Items within `depth` hops of `start`.
    Related { start: String, depth: usize },

    /// Embedding neighbors of one item.
    RecommendItem { item: String, k: usize },

    /// Embedding recommendations for a basket.
    RecommendBasket { items: Vec<String>, k: usize },

    /// Embedding recommendations for a purchase history.
    RecommendCustomer { purchased: Vec<String>, k: usize },

    /// Graph summary.
    Stats,
}

impl Query {
    /// Count helper.
    #[must_use]
    pub fn count(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self::Count {
            a: a.into(),
            b: b.into(),
        }
    }

    /// Top-with-item helper.
    #[must_use]
    pub fn top_with_item(item: impl Into<String>, limit: usize) -> Self {
        Self::TopWithItem {
            item: item.into(),
            limit,
        }
    }

    /// Related-items helper.
    #[must_use]
    pub fn related(start: impl Into<String>, depth: usize) -> Self {
        Self::Related {
            start: start.into(),
            depth,
        }
    }

    /// Single-item recommendation helper.
    #[must_use]
    pub fn recommend_item(item: impl Into<String>, k: usize) -> Self {
        Self::RecommendItem {
            item: item.into(),
            k,
        }
    }

    /// Whether answering this query needs the embedding.
    #[must_use]
    pub fn needs_embedding(&self) -> bool {
        matches!(
            self,
            Self::RecommendItem { .. } | Self::RecommendBasket { .. } | Self::RecommendCustomer { .. }
        )
    }
}

/// Result of executing a `Query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum QueryResult {
    Count(u64),
    Neighbors(Vec<Neighbor>),
    Pairs(Vec<PairEntry>),
    Flag(bool),
    Items(Vec<String>),
    Recommendations(Vec<Recommendation>),
    Stats(GraphStats),
}

impl QueryResult {
    /// Whether the result carries no rows (counts and flags are never empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Neighbors(rows) => rows.is_empty(),
            Self::Pairs(rows) => rows.is_empty(),
            Self::Items(rows) => rows.is_empty(),
            Self::Recommendations(rows) => rows.is_empty(),
            Self::Count(_) | Self::Flag(_) | Self::Stats(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_helpers() {
        assert_eq!(
            Query::count("a", "b"),
            Query::Count {
                a: "a".into(),
                b: "b".into()
            }
        );
        assert_eq!(
            Query::related("a", 2),
            Query::Related {
                start: "a".into(),
                depth: 2
            }
        );
    }

    #[test]
    fn only_recommendations_need_embedding() {
        assert!(Query::recommend_item("a", 3).needs_embedding());
        assert!(
            Query::RecommendBasket {
                items: vec!["a".into()],
                k: 3
            }
            .needs_embedding()
        );
        assert!(!Query::top_with_item("a", 3).needs_embedding());
        assert!(!Query::Stats.needs_embedding());
    }

    #[test]
    fn result_emptiness() {
        assert!(QueryResult::Items(Vec::new()).is_empty());
        assert!(!QueryResult::Count(0).is_empty());
        assert!(!QueryResult::Flag(false).is_empty());
    }
}
