//! # Graph Metrics
//!
//! Summary numbers for a co-occurrence graph, computed in one pass over the
//! stored pairs.

use crate::graph::CoOccurrenceGraph;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of catalog items.
    pub item_count: usize,
    /// Number of stored (non-zero) pairs.
    pub pair_count: usize,
    /// Sum of all pair weights.
    pub total_weight: u64,
    /// Heaviest single pair weight (0 for an empty graph).
    pub max_weight: u64,
    /// Items that take part in no stored pair.
    pub isolated_items: usize,
}

impl GraphStats {
    #[must_use]
    pub fn from_graph(graph: &CoOccurrenceGraph) -> Self {
        let mut touched = vec![false; graph.item_count()];
        let mut total_weight = 0u64;
        let mut max_weight = 0u64;

        for (key, count) in graph.pair_weights() {
            total_weight = total_weight.saturating_add(count);
            max_weight = max_weight.max(count);
            for id in [key.low(), key.high()] {
                if let Some(flag) = touched.get_mut(id.index()) {
                    *flag = true;
                }
            }
        }

        Self {
            item_count: graph.item_count(),
            pair_count: graph.pair_count(),
            total_weight,
            max_weight,
            isolated_items: touched.iter().filter(|&&t| !t).count(),
        }
    }

    /// Stored pairs per thousand possible pairs (integer, rounded down).
    #[must_use]
    pub fn density_per_thousand(&self) -> u64 {
        let n = self.item_count as u64;
        let possible = n.saturating_mul(n.saturating_sub(1)) / 2;
        if possible == 0 {
            return 0;
        }
        (self.pair_count as u64).saturating_mul(1000) / possible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_of_sample_graph() {
        let mut graph = CoOccurrenceGraph::new();
        graph.add_transaction(["a", "b", "c"]);
        graph.add_transaction(["a", "b"]);
        graph.register_item("lonely");

        let stats = GraphStats::from_graph(&graph);
        assert_eq!(stats.item_count, 4);
        assert_eq!(stats.pair_count, 3);
        assert_eq!(stats.total_weight, 4);
        assert_eq!(stats.max_weight, 2);
        assert_eq!(stats.isolated_items, 1);
        assert_eq!(stats.density_per_thousand(), 500);
    }

    #[test]
    fn stats_of_empty_graph() {
        let stats = GraphStats::from_graph(&CoOccurrenceGraph::new());
        assert_eq!(stats, GraphStats::default());
        assert_eq!(stats.density_per_thousand(), 0);
    }
}
