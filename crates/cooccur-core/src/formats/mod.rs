//! # Formats Module
//!
//! Serialization formats for co-occurrence graphs.
//!
//! Pure byte transformations only; file I/O lives in the app layer.

pub mod persistence;

pub use persistence::{PersistenceHeader, graph_from_bytes, graph_to_bytes};
