//! # redb-backed Relational Store
//!
//! Durable storage for a co-occurrence graph using the redb embedded
//! database, laid out as two relations:
//!
//! - `items`: `id -> name`, one row per catalog item
//! - `co_occurrences`: `(item1_id, item2_id) -> count`, one row per stored
//!   pair with `item1_id < item2_id`
//!
//! The store is a collaborator of the engine, not part of it: the in-memory
//! graph never persists itself. `save` writes a whole snapshot in one ACID
//! write transaction; `load` rebuilds a graph through the bulk-restore path,
//! which preserves catalog ids exactly.

use crate::graph::CoOccurrenceGraph;
use crate::{CooccurError, PersistedGraph, PersistedItem, PersistedPair};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for items: id -> name.
const ITEMS: TableDefinition<u64, &str> = TableDefinition::new("items");

/// Table for pair counts: (item1_id, item2_id) -> count.
const CO_OCCURRENCES: TableDefinition<(u64, u64), u64> = TableDefinition::new("co_occurrences");

fn io_error(e: impl std::fmt::Display) -> CooccurError {
    CooccurError::IoError(e.to_string())
}

/// A redb database holding one persisted graph.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CooccurError> {
        let db = Database::create(path.as_ref()).map_err(io_error)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_error)?;
            let _ = write_txn.open_table(ITEMS).map_err(io_error)?;
            let _ = write_txn.open_table(CO_OCCURRENCES).map_err(io_error)?;
            write_txn.commit().map_err(io_error)?;
        }

        Ok(Self { db })
    }

    /// Replace the stored graph with `graph` in a single write transaction.
    pub fn save(&self, graph: &CoOccurrenceGraph) -> Result<(), CooccurError> {
        let persisted = graph.to_persisted();

        let write_txn = self.db.begin_write().map_err(io_error)?;
        {
            let mut items_table = write_txn.open_table(ITEMS).map_err(io_error)?;
            items_table.retain(|_, _| false).map_err(io_error)?;
            for item in &persisted.items {
                items_table
                    .insert(item.id, item.name.as_str())
                    .map_err(io_error)?;
            }

            let mut pairs_table = write_txn.open_table(CO_OCCURRENCES).map_err(io_error)?;
            pairs_table.retain(|_, _| false).map_err(io_error)?;
            for pair in &persisted.pairs {
                pairs_table
                    .insert((pair.item1_id, pair.item2_id), pair.count)
                    .map_err(io_error)?;
            }
        }
        write_txn.commit().map_err(io_error)?;

        Ok(())
    }

    /// Read both relations without restoring a graph.
    pub fn read_persisted(&self) -> Result<PersistedGraph, CooccurError> {
        let read_txn = self.db.begin_read().map_err(io_error)?;

        let items_table = read_txn.open_table(ITEMS).map_err(io_error)?;
        let mut items = Vec::new();
        for entry in items_table.iter().map_err(io_error)? {
            let (key, value) = entry.map_err(io_error)?;
            items.push(PersistedItem {
                id: key.value(),
                name: value.value().to_owned(),
            });
        }

        let pairs_table = read_txn.open_table(CO_OCCURRENCES).map_err(io_error)?;
        let mut pairs = Vec::new();
        for entry in pairs_table.iter().map_err(io_error)? {
            let (key, value) = entry.map_err(io_error)?;
            let (item1_id, item2_id) = key.value();
            pairs.push(PersistedPair {
                item1_id,
                item2_id,
                count: value.value(),
            });
        }

        Ok(PersistedGraph { items, pairs })
    }

    /// Restore the stored graph.
    pub fn load(&self) -> Result<CoOccurrenceGraph, CooccurError> {
        CoOccurrenceGraph::restore(&self.read_persisted()?)
    }

    /// Number of stored item rows.
    pub fn item_count(&self) -> Result<usize, CooccurError> {
        let read_txn = self.db.begin_read().map_err(io_error)?;
        let table = read_txn.open_table(ITEMS).map_err(io_error)?;
        Ok(table.len().map_err(io_error)? as usize)
    }

    /// Number of stored pair rows.
    pub fn pair_count(&self) -> Result<usize, CooccurError> {
        let read_txn = self.db.begin_read().map_err(io_error)?;
        let table = read_txn.open_table(CO_OCCURRENCES).map_err(io_error)?;
        Ok(table.len().map_err(io_error)? as usize)
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), CooccurError> {
        self.db.compact().map_err(io_error)?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_graph() -> CoOccurrenceGraph {
        let mut graph = CoOccurrenceGraph::new();
        graph.add_transaction(["a", "b", "c"]);
        graph.add_transaction(["a", "b"]);
        graph.add_transaction(["b", "c"]);
        graph.register_item("d");
        graph
    }

    #[test]
    fn fresh_store_is_empty() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        assert_eq!(store.item_count().expect("count"), 0);
        assert!(store.load().expect("load").items().is_empty());
    }

    #[test]
    fn save_and_load_preserve_ids_and_counts() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");

        let graph = sample_graph();
        store.save(&graph).expect("save");
        assert_eq!(store.item_count().expect("count"), 4);
        assert_eq!(store.pair_count().expect("count"), 3);

        let loaded = store.load().expect("load");
        assert_eq!(loaded.items(), ["a", "b", "c", "d"]);
        for ((a, b), count) in graph.iter_pairs() {
            assert_eq!(loaded.get_count(a, b), count);
        }
    }

    #[test]
    fn rows_are_canonical() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        store.save(&sample_graph()).expect("save");

        let persisted = store.read_persisted().expect("read");
        assert!(persisted.pairs.iter().all(|p| p.item1_id < p.item2_id));
    }

    #[test]
    fn save_replaces_previous_contents() {
        let temp = tempdir().expect("temp dir");
        let store = RedbStore::open(temp.path().join("test.redb")).expect("open db");
        store.save(&sample_graph()).expect("save");

        let mut smaller = CoOccurrenceGraph::new();
        smaller.add_pair("x", "y");
        store.save(&smaller).expect("save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded.items(), ["x", "y"]);
        assert_eq!(loaded.pair_count(), 1);
    }

    #[test]
    fn recovery_after_reopen() {
        let temp = tempdir().expect("temp dir");
        let db_path = temp.path().join("test.redb");

        {
            let store = RedbStore::open(&db_path).expect("open db");
            store.save(&sample_graph()).expect("save");
        }

        {
            let mut store = RedbStore::open(&db_path).expect("reopen db");
            store.compact().expect("compact");
            let loaded = store.load().expect("load");
            assert_eq!(loaded.get_count("a", "b"), 2);
            assert_eq!(loaded.get_count("c", "b"), 2);
            assert_eq!(loaded.items(), ["a", "b", "c", "d"]);
        }
    }
}
