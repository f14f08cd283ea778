//! # cooccur-core
//!
//! The deterministic co-purchase engine - THE LOGIC.
//!
//! Records which items are bought together and answers questions about it:
//!
//! - `catalog`: stable name ↔ id interning
//! - `graph`: sparse weighted co-occurrence graph and BFS traversal
//! - `ranking`: top pairs, top partners, threshold checks
//! - `matrix` → `embedding` → `recommend`: dense co-occurrence matrix,
//!   truncated SVD embedding and cosine-similarity recommendations
//! - `session`: explicit owned handle caching derived artifacts
//! - `formats` / `storage`: binary snapshots and the redb relational store
//!
//! ## Architectural Constraints
//!
//! - Deterministic: `BTreeMap`/`BTreeSet` only, no hash-ordered iteration
//! - Integer weights for the graph; floats only in the embedding pipeline
//! - No async, no network, no logging: presentation layers own I/O

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod embedding;
pub mod formats;
pub mod graph;
pub mod ingestor;
pub mod matrix;
pub mod primitives;
pub mod query;
pub mod ranking;
pub mod recommend;
pub mod session;
pub mod stats;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    CooccurError, ItemId, Neighbor, PairEntry, PairKey, PersistedGraph, PersistedItem,
    PersistedPair, Recommendation,
};

// =============================================================================
// RE-EXPORTS: Graph Engine
// =============================================================================

pub use catalog::ItemCatalog;
pub use graph::{Adjacency, CoOccurrenceGraph};
pub use ingestor::{IngestReport, Ingestor};
pub use query::{Query, QueryResult};
pub use ranking::{are_often_copurchased, top_pairs, top_with_item};
pub use session::Session;
pub use stats::GraphStats;
pub use storage::RedbStore;

// =============================================================================
// RE-EXPORTS: Embedding Pipeline
// =============================================================================

pub use embedding::{Embedding, compute_embeddings, symmetric_eigen};
pub use matrix::{DenseMatrix, build_dense_matrix};
pub use recommend::{Recommender, normalize_rows};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{PersistenceHeader, graph_from_bytes, graph_to_bytes};
