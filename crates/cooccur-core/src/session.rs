//! # Session Module
//!
//! An explicit, owned handle over one co-occurrence graph.
//!
//! A `Session` replaces any process-wide store: presentation layers create
//! one, load it (from transactions, a snapshot or a database), query it and
//! drop it. Several sessions can coexist, which keeps tests isolated.
//!
//! ## Derived-artifact cache
//!
//! The dense matrix → embedding → recommender pipeline is a full rebuild and
//! the most expensive operation in the engine. The session caches the last
//! built model together with the graph version and rank it came from, and
//! rebuilds only when the graph version advanced or the rank changed. The
//! traversal `Adjacency` index is cached the same way.
//!
//! A session is single-writer: mutation needs `&mut self`.

use crate::embedding::Embedding;
use crate::graph::{Adjacency, CoOccurrenceGraph};
use crate::ingestor::Ingestor;
use crate::matrix::build_dense_matrix;
use crate::primitives::DEFAULT_EMBEDDING_RANK;
use crate::query::{Query, QueryResult};
use crate::ranking;
use crate::recommend::Recommender;
use crate::stats::GraphStats;
use crate::CooccurError;

/// Embedding plus its normalized recommender, built together.
#[derive(Debug, Clone)]
struct Model {
    embedding: Embedding,
    recommender: Recommender,
}

impl Model {
    fn build(graph: &CoOccurrenceGraph, rank: usize) -> Result<Self, CooccurError> {
        let dense = build_dense_matrix(graph);
        let embedding = Embedding::from_dense(&dense, rank)?;
        let recommender = Recommender::new(&embedding);
        Ok(Self {
            embedding,
            recommender,
        })
    }

    fn is_current(&self, version: u64, rank: usize) -> bool {
        self.embedding.version == version && self.embedding.requested_rank == rank
    }
}

/// A graph together with its cached derived artifacts.
#[derive(Debug, Clone)]
pub struct Session {
    graph: CoOccurrenceGraph,
    rank: usize,
    model: Option<Model>,
    adjacency: Option<Adjacency>,
    model_builds: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::with_graph(CoOccurrenceGraph::new())
    }
}

impl Session {
    /// Create an empty session using `DEFAULT_EMBEDDING_RANK`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session over an existing graph.
    #[must_use]
    pub fn with_graph(graph: CoOccurrenceGraph) -> Self {
        Self {
            graph,
            rank: DEFAULT_EMBEDDING_RANK,
            model: None,
            adjacency: None,
            model_builds: 0,
        }
    }

    /// Set the embedding rank (builder style).
    #[must_use]
    pub fn with_rank(mut self, rank: usize) -> Self {
        self.rank = rank;
        self
    }

    /// Change the embedding rank. The next recommendation rebuilds the model.
    pub fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }

    #[must_use]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[must_use]
    pub fn graph(&self) -> &CoOccurrenceGraph {
        &self.graph
    }

    /// Mutable graph access. Cached artifacts notice changes through the
    /// graph version, so direct mutation is safe.
    pub fn graph_mut(&mut self) -> &mut CoOccurrenceGraph {
        &mut self.graph
    }

    /// Consume the session, returning its graph.
    #[must_use]
    pub fn into_graph(self) -> CoOccurrenceGraph {
        self.graph
    }

    /// Drop the graph and every cached artifact.
    pub fn reset(&mut self) {
        self.graph = CoOccurrenceGraph::new();
        self.model = None;
        self.adjacency = None;
    }

    /// Validate and record one transaction.
    pub fn ingest_transaction<S: AsRef<str>>(&mut self, items: &[S]) -> Result<(), CooccurError> {
        Ingestor::ingest_transaction(&mut self.graph, items)
    }

    /// Whether the next recommendation would rebuild the model.
    #[must_use]
    pub fn is_embedding_stale(&self) -> bool {
        self.model
            .as_ref()
            .is_none_or(|model| !model.is_current(self.graph.version(), self.rank))
    }

    /// How many times the model has been (re)built by this session.
    #[must_use]
    pub fn model_builds(&self) -> u64 {
        self.model_builds
    }

    fn model(&mut self) -> Result<&Model, CooccurError> {
        let version = self.graph.version();
        let rank = self.rank;
        let model = match self.model.take().filter(|m| m.is_current(version, rank)) {
            Some(model) => model,
            None => {
                let model = Model::build(&self.graph, rank)?;
                self.model_builds = self.model_builds.saturating_add(1);
                model
            }
        };
        Ok(&*self.model.insert(model))
    }

    /// Current embedding, rebuilt if stale.
    pub fn embedding(&mut self) -> Result<&Embedding, CooccurError> {
        Ok(&self.model()?.embedding)
    }

    /// Current recommender, rebuilt if stale.
    pub fn recommender(&mut self) -> Result<&Recommender, CooccurError> {
        Ok(&self.model()?.recommender)
    }

    /// Related items through the cached adjacency index.
    pub fn related(&mut self, start: &str, depth: usize) -> Vec<String> {
        if depth == 0 || !self.graph.catalog().contains(start) {
            return Vec::new();
        }
        let adjacency = match self.adjacency.take().filter(|a| a.is_current(&self.graph)) {
            Some(adjacency) => adjacency,
            None => Adjacency::build(&self.graph),
        };
        self.adjacency
            .insert(adjacency)
            .bfs_related(&self.graph, start, depth)
    }

    /// Execute a structured query.
    ///
    /// Only recommendation queries can fail, and only when the factorization
    /// fails.
    pub fn execute(&mut self, query: &Query) -> Result<QueryResult, CooccurError> {
        let result = match query {
            Query::Count { a, b } => QueryResult::Count(self.graph.get_count(a, b)),
            Query::TopWithItem { item, limit } => {
                QueryResult::Neighbors(ranking::top_with_item(&self.graph, item, *limit))
            }
            Query::TopPairs { limit } => QueryResult::Pairs(ranking::top_pairs(&self.graph, *limit)),
            Query::OftenCopurchased { a, b, min_count } => QueryResult::Flag(
                ranking::are_often_copurchased(&self.graph, a, b, *min_count),
            ),
            Query::Related { start, depth } => QueryResult::Items(self.related(start, *depth)),
            Query::RecommendItem { item, k } => {
                QueryResult::Recommendations(self.recommender()?.recommend_for_item(item, *k))
            }
            Query::RecommendBasket { items, k } => {
                QueryResult::Recommendations(self.recommender()?.recommend_for_basket(items, *k))
            }
            Query::RecommendCustomer { purchased, k } => QueryResult::Recommendations(
                self.recommender()?.recommend_for_customer(purchased, *k),
            ),
            Query::Stats => QueryResult::Stats(GraphStats::from_graph(&self.graph)),
        };
        Ok(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================
