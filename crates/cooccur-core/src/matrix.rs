//! # Dense Matrix Builder
//!
//! Materializes a `CoOccurrenceGraph` into a dense symmetric `n x n` matrix.
//! Row and column `i` always correspond to `names[i]`, which is catalog id
//! order; every downstream consumer relies on that pairing.

use crate::graph::CoOccurrenceGraph;
use ndarray::Array2;

/// A dense co-occurrence matrix and the names defining its index space.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    pub names: Vec<String>,
    pub values: Array2<f64>,
    /// Graph version the matrix was built from.
    pub version: u64,
}

impl DenseMatrix {
    /// Number of items (rows = columns).
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Build `M` with `M[i][j] = M[j][i] = weight(i, j)` and a zero diagonal.
#[must_use]
pub fn build_dense_matrix(graph: &CoOccurrenceGraph) -> DenseMatrix {
    let names = graph.items().to_vec();
    let n = names.len();
    let mut values = Array2::<f64>::zeros((n, n));

    for (key, count) in graph.pair_weights() {
        let (i, j) = (key.low().index(), key.high().index());
        let weight = count as f64;
        values[[i, j]] = weight;
        values[[j, i]] = weight;
    }

    DenseMatrix {
        names,
        values,
        version: graph.version(),
    }
}
