//! # Low-Rank Embedder
//!
//! Factorizes a symmetric co-occurrence matrix into per-item vectors.
//!
//! The embedding is `U_k * diag(S_k)`: the top-`k` left singular vectors
//! scaled by their singular values. For a symmetric `M = V * diag(λ) * Vᵀ`
//! the singular values are `|λ|` and each left singular vector is the
//! eigenvector with sign `sign(λ)`, so `U_k * diag(S_k) = V_k * diag(λ_k)`
//! with components ordered by descending `|λ|`. The eigen decomposition is
//! nalgebra's `SymmetricEigen`.
//!
//! This is a full, non-incremental factorization. It knows nothing about the
//! graph it came from; staleness is tracked through `Embedding::version`.

#![allow(clippy::float_arithmetic)]

use crate::matrix::DenseMatrix;
use crate::CooccurError;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2};
use std::cmp::Ordering;

/// Item embeddings aligned with catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// `names[i]` is the item embedded in row `i`.
    pub names: Vec<String>,
    /// `n x rank` matrix, one row per item.
    pub vectors: Array2<f64>,
    /// Rank requested by the caller (before clamping).
    pub requested_rank: usize,
    /// Graph version of the source matrix.
    pub version: u64,
}

impl Embedding {
    /// Factorize a dense matrix, keeping its name ordering and version.
    pub fn from_dense(dense: &DenseMatrix, rank: usize) -> Result<Self, CooccurError> {
        let vectors = compute_embeddings(&dense.values, rank)?;
        Ok(Self {
            names: dense.names.clone(),
            vectors,
            requested_rank: rank,
            version: dense.version,
        })
    }

    /// Number of latent dimensions actually kept.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        self.vectors.ncols()
    }
}

/// Compute the `n x k` embedding of a square symmetric matrix.
///
/// `rank` is clamped to `[1, n]`. An empty matrix yields a `0 x 0` result.
///
/// # Errors
///
/// - `NonSquareMatrix` when rows != columns
pub fn compute_embeddings(matrix: &Array2<f64>, rank: usize) -> Result<Array2<f64>, CooccurError> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(CooccurError::NonSquareMatrix { rows, cols });
    }
    let n = rows;
    if n == 0 {
        return Ok(Array2::zeros((0, 0)));
    }
    let k = rank.clamp(1, n);

    let (eigenvalues, eigenvectors) = symmetric_eigen(matrix)?;

    // Order components by singular value |λ| descending; ties keep index order.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&x, &y| {
        eigenvalues[y]
            .abs()
            .partial_cmp(&eigenvalues[x].abs())
            .unwrap_or(Ordering::Equal)
    });

    let mut embedding = Array2::<f64>::zeros((n, k));
    for (column, &component) in order.iter().take(k).enumerate() {
        let lambda = eigenvalues[component];
        for row in 0..n {
            embedding[[row, column]] = eigenvectors[[row, component]] * lambda;
        }
    }

    Ok(embedding)
}

/// Eigen decomposition of a symmetric matrix.
///
/// Returns `(λ, V)` with `M * V[:, i] = λ[i] * V[:, i]` and orthonormal `V`.
/// Only the lower triangle of the input is read.
pub fn symmetric_eigen(matrix: &Array2<f64>) -> Result<(Array1<f64>, Array2<f64>), CooccurError> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(CooccurError::NonSquareMatrix { rows, cols });
    }
    let n = rows;

    let eigen = SymmetricEigen::new(DMatrix::from_fn(n, n, |i, j| matrix[[i, j]]));

    let eigenvalues = Array1::from_iter(eigen.eigenvalues.iter().copied());
    let eigenvectors = Array2::from_shape_fn((n, n), |(i, j)| eigen.eigenvectors[(i, j)]);
    Ok((eigenvalues, eigenvectors))
}
