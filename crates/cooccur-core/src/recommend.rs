//! # Similarity Recommender
//!
//! Ranks catalog items by cosine similarity against a query profile built
//! from one item, a basket, or a purchase history.
//!
//! Rows of the embedding are normalized to unit length once, at construction;
//! all-zero rows stay zero. Similarity is then a plain dot product.
//!
//! Ordering: descending similarity. Equal similarities keep ascending
//! catalog index order (stable sort).

#![allow(clippy::float_arithmetic)]

use crate::embedding::Embedding;
use crate::Recommendation;
use ndarray::{Array1, Array2, ArrayView1};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Row-normalize to unit Euclidean norm, leaving zero rows untouched.
#[must_use]
pub fn normalize_rows(matrix: &Array2<f64>) -> Array2<f64> {
    let mut normalized = matrix.clone();
    for mut row in normalized.rows_mut() {
        let norm = row.dot(&row).sqrt();
        if norm != 0.0 {
            row.mapv_inplace(|x| x / norm);
        }
    }
    normalized
}

/// Cosine-similarity ranking over one embedding.
#[derive(Debug, Clone)]
pub struct Recommender {
    names: Vec<String>,
    index: BTreeMap<String, usize>,
    unit_vectors: Array2<f64>,
    version: u64,
}

impl Recommender {
    #[must_use]
    pub fn new(embedding: &Embedding) -> Self {
        let index = embedding
            .names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names: embedding.names.clone(),
            index,
            unit_vectors: normalize_rows(&embedding.vectors),
            version: embedding.version,
        }
    }

    /// Graph version of the embedding behind this recommender.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Items most similar to `item`, excluding `item` itself.
    ///
    /// Empty for an unknown item or `k == 0`.
    #[must_use]
    pub fn recommend_for_item(&self, item: &str, k: usize) -> Vec<Recommendation> {
        if k == 0 {
            return Vec::new();
        }
        let Some(&idx) = self.index.get(item) else {
            return Vec::new();
        };

        let excluded = BTreeSet::from([idx]);
        self.rank(self.unit_vectors.row(idx), &excluded, k)
    }

    /// Items most similar to the mean profile of a basket.
    ///
    /// Unknown names are dropped silently; every known basket item is
    /// excluded from the candidates.
    #[must_use]
    pub fn recommend_for_basket<I, S>(&self, basket: I, k: usize) -> Vec<Recommendation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.recommend_for_profile(basket, k)
    }

    /// Items not yet purchased that best match the purchase history.
    ///
    /// Same average-profile ranking as `recommend_for_basket`.
    #[must_use]
    pub fn recommend_for_customer<I, S>(&self, purchased: I, k: usize) -> Vec<Recommendation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.recommend_for_profile(purchased, k)
    }

    fn recommend_for_profile<I, S>(&self, items: I, k: usize) -> Vec<Recommendation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if k == 0 {
            return Vec::new();
        }

        // Duplicates are kept, so a repeated item weighs more in the mean.
        let indices: Vec<usize> = items
            .into_iter()
            .filter_map(|name| self.index.get(name.as_ref()).copied())
            .collect();
        if indices.is_empty() {
            return Vec::new();
        }

        let mut profile = Array1::<f64>::zeros(self.unit_vectors.ncols());
        for &i in &indices {
            profile += &self.unit_vectors.row(i);
        }
        profile /= indices.len() as f64;

        let excluded: BTreeSet<usize> = indices.into_iter().collect();
        self.rank(profile.view(), &excluded, k)
    }

    fn rank(
        &self,
        query: ArrayView1<'_, f64>,
        excluded: &BTreeSet<usize>,
        k: usize,
    ) -> Vec<Recommendation> {
        let similarities = self.unit_vectors.dot(&query);

        let mut scored: Vec<(usize, f64)> = similarities
            .iter()
            .enumerate()
            .filter(|(i, _)| !excluded.contains(i))
            .map(|(i, &s)| (i, s))
            .collect();

        // Stable: equal scores keep ascending index order.
        scored.sort_by(|x, y| y.1.partial_cmp(&x.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        scored
            .into_iter()
            .filter_map(|(i, similarity)| {
                self.names.get(i).map(|name| Recommendation {
                    name: name.clone(),
                    similarity,
                })
            })
            .collect()
    }
}
