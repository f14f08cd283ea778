//! # Ingestor Module
//!
//! Transaction validation and ingestion for the co-occurrence graph.
//!
//! - Validate item names before graph mutation
//! - Reject oversized baskets (pair expansion is quadratic)
//! - Group raw `(purchase key, item)` rows into transactions
//! - No interpretation of item names beyond validation

use crate::graph::CoOccurrenceGraph;
use crate::primitives::{MAX_ITEM_NAME_LENGTH, MAX_TRANSACTION_ITEMS};
use crate::CooccurError;
use std::collections::{BTreeMap, BTreeSet};

/// Summary of one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub transactions: usize,
    pub items_before: usize,
    pub items_after: usize,
    pub pairs_before: usize,
    pub pairs_after: usize,
}

/// The Ingestor handles validation and graph ingestion of transactions.
pub struct Ingestor;

impl Ingestor {
    /// Validate an item name.
    ///
    /// A name is valid if it is non-empty and at most `MAX_ITEM_NAME_LENGTH`
    /// bytes.
    pub fn validate_item(name: &str) -> Result<(), CooccurError> {
        if name.is_empty() || name.len() > MAX_ITEM_NAME_LENGTH {
            return Err(CooccurError::InvalidItem);
        }
        Ok(())
    }

    /// Validate a whole transaction without touching the graph.
    pub fn validate_transaction<S: AsRef<str>>(items: &[S]) -> Result<(), CooccurError> {
        let mut distinct = BTreeSet::new();
        for item in items {
            let name = item.as_ref();
            Self::validate_item(name)?;
            distinct.insert(name);
        }
        if distinct.len() > MAX_TRANSACTION_ITEMS {
            return Err(CooccurError::InvalidTransaction(distinct.len()));
        }
        Ok(())
    }

    /// Validate then record one transaction.
    ///
    /// The graph is untouched when validation fails.
    pub fn ingest_transaction<S: AsRef<str>>(
        graph: &mut CoOccurrenceGraph,
        items: &[S],
    ) -> Result<(), CooccurError> {
        Self::validate_transaction(items)?;
        graph.add_transaction(items.iter().map(AsRef::as_ref));
        Ok(())
    }

    /// Validate every transaction, then record all of them.
    ///
    /// The batch is rejected atomically: if any transaction is invalid the
    /// graph is untouched.
    pub fn ingest_transactions<S: AsRef<str>>(
        graph: &mut CoOccurrenceGraph,
        transactions: &[Vec<S>],
    ) -> Result<IngestReport, CooccurError> {
        for transaction in transactions {
            Self::validate_transaction(transaction)?;
        }

        let mut report = IngestReport {
            transactions: transactions.len(),
            items_before: graph.item_count(),
            pairs_before: graph.pair_count(),
            ..IngestReport::default()
        };
        for transaction in transactions {
            graph.add_transaction(transaction.iter().map(AsRef::as_ref));
        }
        report.items_after = graph.item_count();
        report.pairs_after = graph.pair_count();
        Ok(report)
    }

    /// Group `(purchase key, item)` rows into transactions.
    ///
    /// Groups appear in first-seen key order; items keep row order inside a
    /// group (duplicates are left for `add_transaction` to drop).
    #[must_use]
    pub fn group_rows<K, S>(rows: &[(K, S)]) -> Vec<Vec<String>>
    where
        K: AsRef<str>,
        S: AsRef<str>,
    {
        let mut slots: BTreeMap<&str, usize> = BTreeMap::new();
        let mut groups: Vec<Vec<String>> = Vec::new();

        for (key, item) in rows {
            let slot = *slots.entry(key.as_ref()).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            if let Some(group) = groups.get_mut(slot) {
                group.push(item.as_ref().to_owned());
            }
        }
        groups
    }

    /// Ingest raw purchase rows.
    ///
    /// Every item is registered in first-seen row order before any pair is
    /// counted, so items that were only ever bought alone still enter the
    /// catalog. Validation covers all rows up front.
    pub fn ingest_grouped<K, S>(
        graph: &mut CoOccurrenceGraph,
        rows: &[(K, S)],
    ) -> Result<IngestReport, CooccurError>
    where
        K: AsRef<str>,
        S: AsRef<str>,
    {
        let groups = Self::group_rows(rows);
        for group in &groups {
            Self::validate_transaction(group)?;
        }

        let items_before = graph.item_count();
        let pairs_before = graph.pair_count();
        for (_, item) in rows {
            graph.register_item(item.as_ref());
        }
        for group in &groups {
            graph.add_transaction(group);
        }

        Ok(IngestReport {
            transactions: groups.len(),
            items_before,
            items_after: graph.item_count(),
            pairs_before,
            pairs_after: graph.pair_count(),
        })
    }
}
