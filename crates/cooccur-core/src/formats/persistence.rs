//! # Persistence Format
//!
//! Binary snapshot format for co-occurrence graphs.
//!
//! Format: Header (5 bytes) + postcard-serialized `PersistedGraph`.
//! - 4 bytes: Magic ("COOC")
//! - 1 byte: Version
//!
//! The payload is the same two-relation layout the redb store uses
//! (`items`, `co_occurrences`), so a snapshot restores through the same
//! bulk-restore path and keeps catalog ids exactly.
//!
//! ## Validation
//!
//! Size limits and the header are checked BEFORE the payload is decoded.

use crate::graph::CoOccurrenceGraph;
use crate::{primitives, CooccurError, PersistedGraph};

/// Maximum allowed snapshot size.
///
/// Checked before decoding to avoid allocation blow-ups on corrupted input.
pub const MAX_PERSISTENCE_PAYLOAD_SIZE: usize = 500 * 1024 * 1024; // 500 MB

/// Header length in bytes.
const HEADER_SIZE: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The persistence header precedes all graph data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Create a new header with current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), CooccurError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(CooccurError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(CooccurError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CooccurError> {
        let Some(header) = bytes.get(..HEADER_SIZE) else {
            return Err(CooccurError::DeserializationError(
                "Header too short".to_string(),
            ));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[0..4]);
        Ok(Self {
            magic,
            version: header[4],
        })
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a graph to bytes (header + payload).
pub fn graph_to_bytes(graph: &CoOccurrenceGraph) -> Result<Vec<u8>, CooccurError> {
    let header = PersistenceHeader::new();
    let persisted = graph.to_persisted();

    let payload = postcard::to_stdvec(&persisted)
        .map_err(|e| CooccurError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);

    Ok(result)
}

/// Deserialize a graph from bytes.
///
/// Validates, in order: minimum size, maximum size, header magic and
/// version. Only then is the payload decoded and restored.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<CoOccurrenceGraph, CooccurError> {
    if bytes.len() < HEADER_SIZE {
        return Err(CooccurError::DeserializationError(format!(
            "Data too short: minimum {} bytes required",
            HEADER_SIZE
        )));
    }

    if bytes.len() > MAX_PERSISTENCE_PAYLOAD_SIZE {
        return Err(CooccurError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PERSISTENCE_PAYLOAD_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    let persisted: PersistedGraph = postcard::from_bytes(&bytes[HEADER_SIZE..]).map_err(|e| {
        CooccurError::DeserializationError(format!("Failed to decode graph data: {}", e))
    })?;

    CoOccurrenceGraph::restore(&persisted)
}

// =============================================================================
// TESTS
// =============================================================================
