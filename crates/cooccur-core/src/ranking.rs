//! # Ranking Queries
//!
//! Read-only ranked views over a `CoOccurrenceGraph`.
//!
//! Every ranking applies explicit secondary keys, so output is fully
//! determined by graph contents:
//! - `top_with_item`: descending count, then ascending neighbor name
//! - `top_pairs`: descending count, then ascending `name_a`, then `name_b`

use crate::graph::CoOccurrenceGraph;
use crate::{Neighbor, PairEntry};
use std::cmp::Reverse;

/// Most frequent co-purchases of `item`, at most `limit` entries.
///
/// Empty for an unknown item or `limit == 0`.
#[must_use]
pub fn top_with_item(graph: &CoOccurrenceGraph, item: &str, limit: usize) -> Vec<Neighbor> {
    if limit == 0 {
        return Vec::new();
    }
    let Some(id) = graph.id_of(item) else {
        return Vec::new();
    };

    let mut neighbors: Vec<Neighbor> = graph
        .neighbors_of(id)
        .filter_map(|(other, count)| {
            graph.name_of(other).map(|name| Neighbor {
                name: name.to_owned(),
                count,
            })
        })
        .collect();

    neighbors.sort_by(|x, y| {
        Reverse(x.count)
            .cmp(&Reverse(y.count))
            .then_with(|| x.name.cmp(&y.name))
    });
    neighbors.truncate(limit);
    neighbors
}

/// Heaviest pairs in the whole graph, at most `limit` entries.
#[must_use]
pub fn top_pairs(graph: &CoOccurrenceGraph, limit: usize) -> Vec<PairEntry> {
    if limit == 0 {
        return Vec::new();
    }

    let mut pairs: Vec<PairEntry> = graph
        .iter_pairs()
        .map(|((a, b), count)| PairEntry {
            name_a: a.to_owned(),
            name_b: b.to_owned(),
            count,
        })
        .collect();

    pairs.sort_by(|x, y| {
        Reverse(x.count)
            .cmp(&Reverse(y.count))
            .then_with(|| x.name_a.cmp(&y.name_a))
            .then_with(|| x.name_b.cmp(&y.name_b))
    });
    pairs.truncate(limit);
    pairs
}

/// Whether `a` and `b` were bought together at least `min_count` times.
#[must_use]
pub fn are_often_copurchased(graph: &CoOccurrenceGraph, a: &str, b: &str, min_count: u64) -> bool {
    graph.get_count(a, b) >= min_count
}
