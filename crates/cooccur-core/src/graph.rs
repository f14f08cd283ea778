//! # Co-Occurrence Graph
//!
//! Sparse, undirected, weighted graph of item co-purchase counts.
//!
//! Every unordered pair is stored exactly once under its canonical `PairKey`
//! in a `BTreeMap`, so enumeration runs in ascending `(low id, high id)`
//! order and is reproducible across runs. Self-pairs are never stored, but
//! referencing an item always registers it in the catalog.
//!
//! The graph carries a `version` that advances on every structural change
//! (a new catalog item or a weight change). Derived artifacts such as the
//! dense matrix, the embedding and the `Adjacency` index record the version
//! they were built from; the graph itself tracks nothing else.
//!
//! Mutation requires `&mut self`. Concurrent writers must be serialized by
//! the caller.

use crate::catalog::ItemCatalog;
use crate::{CooccurError, ItemId, PairKey, PersistedGraph, PersistedItem, PersistedPair};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

// =============================================================================
// GRAPH
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoOccurrenceGraph {
    /// Name <-> id mapping.
    catalog: ItemCatalog,
    /// Canonical pair -> co-occurrence count. No zero-weight entries.
    pairs: BTreeMap<PairKey, u64>,
    /// Structural version, bumped on every effective mutation.
    version: u64,
}

impl CoOccurrenceGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a graph from its persisted relational form.
    ///
    /// Items are replayed in ascending persisted-id order, so the restored
    /// catalog keeps the original relative id order even when the source rows
    /// arrive unsorted or the persisted ids do not start at 0. Each pair row is
    /// then applied through `add_pair_with_count`.
    pub fn restore(persisted: &PersistedGraph) -> Result<Self, CooccurError> {
        let mut graph = Self::new();

        let mut rows: Vec<&PersistedItem> = persisted.items.iter().collect();
        rows.sort_by_key(|row| row.id);

        let mut names_by_id: BTreeMap<u64, &str> = BTreeMap::new();
        for row in rows {
            graph.register_item(&row.name);
            names_by_id.insert(row.id, row.name.as_str());
        }

        for pair in &persisted.pairs {
            let a = names_by_id
                .get(&pair.item1_id)
                .ok_or(CooccurError::UnknownItemId(pair.item1_id))?;
            let b = names_by_id
                .get(&pair.item2_id)
                .ok_or(CooccurError::UnknownItemId(pair.item2_id))?;
            graph.add_weight(a, b, pair.count);
        }

        Ok(graph)
    }

    /// Produce the persisted relational form: one item row per catalog id and
    /// one pair row per stored edge, with `item1_id < item2_id`.
    #[must_use]
    pub fn to_persisted(&self) -> PersistedGraph {
        let items = self
            .catalog
            .names_in_id_order()
            .iter()
            .enumerate()
            .map(|(id, name)| PersistedItem {
                id: id as u64,
                name: name.clone(),
            })
            .collect();

        let pairs = self
            .pairs
            .iter()
            .map(|(key, &count)| PersistedPair {
                item1_id: u64::from(key.low().0),
                item2_id: u64::from(key.high().0),
                count,
            })
            .collect();

        PersistedGraph { items, pairs }
    }

    // -------------------------------------------------------------------------
    // MUTATION
    // -------------------------------------------------------------------------

    /// Register an item name without touching any weight.
    pub fn register_item(&mut self, name: &str) -> ItemId {
        let (id, created) = self.catalog.get_or_create_id(name);
        if created {
            self.bump_version();
        }
        id
    }

    /// Record one co-occurrence of `a` and `b`.
    ///
    /// For `a == b` the item is registered and no weight changes.
    pub fn add_pair(&mut self, a: &str, b: &str) {
        self.add_weight(a, b, 1);
    }

    /// Add a pre-aggregated count to the pair `(a, b)`.
    ///
    /// A self-pair only registers the item. A non-positive `count` is a no-op
    /// for distinct items: neither the catalog nor any weight changes.
    pub fn add_pair_with_count(&mut self, a: &str, b: &str, count: i64) {
        if a == b {
            self.register_item(a);
            return;
        }
        if count <= 0 {
            return;
        }
        self.add_weight(a, b, count.unsigned_abs());
    }

    /// Record one transaction.
    ///
    /// Items are deduplicated preserving first occurrence, then every
    /// unordered pair of the distinct items is counted exactly once. The cost
    /// is quadratic in the number of distinct items.
    pub fn add_transaction<I, S>(&mut self, items: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct = distinct_in_order(items);
        for (i, a) in distinct.iter().enumerate() {
            for b in distinct.iter().skip(i.saturating_add(1)) {
                self.add_pair(a, b);
            }
        }
    }

    /// Shared path of `add_pair`, `add_pair_with_count` and `restore`.
    fn add_weight(&mut self, a: &str, b: &str, amount: u64) {
        let a_id = self.register_item(a);
        let b_id = self.register_item(b);

        let Some(key) = PairKey::new(a_id, b_id) else {
            return;
        };
        if amount == 0 {
            return;
        }

        let weight = self.pairs.entry(key).or_insert(0);
        *weight = weight.saturating_add(amount);
        self.bump_version();
    }

    fn bump_version(&mut self) {
        self.version = self.version.saturating_add(1);
    }

    // -------------------------------------------------------------------------
    // ACCESSORS
    // -------------------------------------------------------------------------

    /// Co-occurrence count of `a` and `b`; 0 for unknown names, self-pairs and
    /// unobserved pairs. Symmetric in its arguments.
    #[must_use]
    pub fn get_count(&self, a: &str, b: &str) -> u64 {
        let (Some(a_id), Some(b_id)) = (self.catalog.id_of(a), self.catalog.id_of(b)) else {
            return 0;
        };
        self.get_count_by_id(a_id, b_id)
    }

    /// Co-occurrence count by catalog id.
    #[must_use]
    pub fn get_count_by_id(&self, a: ItemId, b: ItemId) -> u64 {
        PairKey::new(a, b)
            .and_then(|key| self.pairs.get(&key).copied())
            .unwrap_or(0)
    }

    /// All stored edges as `((name_a, name_b), count)` where `name_a` has the
    /// lower catalog id. Ordered by `(low id, high id)`.
    pub fn iter_pairs(&self) -> impl Iterator<Item = ((&str, &str), u64)> + '_ {
        self.pairs.iter().filter_map(|(key, &count)| {
            let a = self.catalog.name_of(key.low())?;
            let b = self.catalog.name_of(key.high())?;
            Some(((a, b), count))
        })
    }

    /// All stored edges by canonical key.
    pub fn pair_weights(&self) -> impl Iterator<Item = (PairKey, u64)> + '_ {
        self.pairs.iter().map(|(key, &count)| (*key, count))
    }

    /// Neighbors of `id` with their weights, in ascending pair-key order.
    pub fn neighbors_of(&self, id: ItemId) -> impl Iterator<Item = (ItemId, u64)> + '_ {
        self.pairs.iter().filter_map(move |(key, &count)| {
            if key.low() == id {
                Some((key.high(), count))
            } else if key.high() == id {
                Some((key.low(), count))
            } else {
                None
            }
        })
    }

    /// Catalog names in id order.
    #[must_use]
    pub fn items(&self) -> &[String] {
        self.catalog.names_in_id_order()
    }

    #[must_use]
    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ItemId> {
        self.catalog.id_of(name)
    }

    #[must_use]
    pub fn name_of(&self, id: ItemId) -> Option<&str> {
        self.catalog.name_of(id)
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.catalog.len()
    }

    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Structural version of this graph.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Items reachable from `start` within `depth` hops, start excluded,
    /// sorted alphabetically.
    ///
    /// Builds an `Adjacency` once for the whole traversal. Callers running
    /// many traversals over an unchanged graph should build the `Adjacency`
    /// themselves and reuse it.
    #[must_use]
    pub fn bfs_related(&self, start: &str, depth: usize) -> Vec<String> {
        if depth == 0 || !self.catalog.contains(start) {
            return Vec::new();
        }
        Adjacency::build(self).bfs_related(self, start, depth)
    }
}

/// Deduplicate preserving first occurrence.
fn distinct_in_order<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    let mut distinct = Vec::new();
    for item in items {
        let name = item.as_ref();
        if seen.insert(name.to_owned()) {
            distinct.push(name.to_owned());
        }
    }
    distinct
}

// =============================================================================
// ADJACENCY
// =============================================================================

/// Unweighted adjacency index over a graph snapshot.
///
/// Edge presence, not weight, defines adjacency. The index is only valid for
/// the graph version it was built from; see `is_current`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    neighbors: Vec<BTreeSet<ItemId>>,
    version: u64,
}

impl Adjacency {
    /// Build the adjacency sets in one pass over the stored edges.
    #[must_use]
    pub fn build(graph: &CoOccurrenceGraph) -> Self {
        let mut neighbors = vec![BTreeSet::new(); graph.item_count()];
        for (key, _) in graph.pair_weights() {
            if let Some(set) = neighbors.get_mut(key.low().index()) {
                set.insert(key.high());
            }
            if let Some(set) = neighbors.get_mut(key.high().index()) {
                set.insert(key.low());
            }
        }
        Self {
            neighbors,
            version: graph.version(),
        }
    }

    /// Graph version this index was built from.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the index still describes `graph`.
    #[must_use]
    pub fn is_current(&self, graph: &CoOccurrenceGraph) -> bool {
        self.version == graph.version()
    }

    /// Neighbors of `id` in ascending id order.
    pub fn neighbors(&self, id: ItemId) -> impl Iterator<Item = ItemId> + '_ {
        self.neighbors
            .get(id.index())
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Breadth-first expansion from `start` up to `depth` hops.
    ///
    /// Returns an empty list for an unknown start or `depth == 0`. The
    /// visited set bounds the walk to one visit per item, whatever `depth`.
    #[must_use]
    pub fn bfs_related(&self, graph: &CoOccurrenceGraph, start: &str, depth: usize) -> Vec<String> {
        let Some(start_id) = graph.id_of(start) else {
            return Vec::new();
        };
        if depth == 0 {
            return Vec::new();
        }

        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start_id);
        queue.push_back((start_id, 0usize));

        while let Some((current, current_depth)) = queue.pop_front() {
            if current_depth >= depth {
                continue;
            }
            for neighbor in self.neighbors(current) {
                if visited.insert(neighbor) {
                    queue.push_back((neighbor, current_depth.saturating_add(1)));
                }
            }
        }

        visited.remove(&start_id);
        let mut related: Vec<String> = visited
            .into_iter()
            .filter_map(|id| graph.name_of(id).map(str::to_owned))
            .collect();
        related.sort();
        related
    }
}

// =============================================================================
// TESTS
// =============================================================================
