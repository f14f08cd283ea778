//! # Storage Module
//!
//! Relational persistence for co-occurrence graphs.

mod redb_store;

pub use redb_store::RedbStore;
