//! Node Store
//!
//! Key-value persistence for catalog nodes. Metadata and payload blobs are keyed by
//! node id; a node is always written and removed as a unit.

pub mod memory;
pub mod persistence;

pub use memory::MemoryNodeStore;
pub use persistence::SledNodeStore;

use crate::error::StorageError;
use crate::types::{FileNode, NodeId};
use async_trait::async_trait;

/// Node store interface
///
/// Every operation may suspend on storage I/O. Implementations must never return a
/// partially written node: metadata without its payload, or the reverse.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Every persisted node, payloads included. Order is unspecified.
    async fn list_all(&self) -> Result<Vec<FileNode>, StorageError>;

    async fn get(&self, id: &NodeId) -> Result<Option<FileNode>, StorageError>;

    /// Insert or replace by id. A replaced node keeps its original `created_at`.
    async fn put(&self, node: &FileNode) -> Result<(), StorageError>;

    /// Remove a node and its payload. Unknown ids are a no-op.
    async fn delete(&self, id: &NodeId) -> Result<(), StorageError>;

    /// Remove every node and every payload blob.
    async fn clear_all(&self) -> Result<(), StorageError>;

    /// Push buffered writes to durable storage.
    async fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }

    /// Short backend name for status output.
    fn backend_name(&self) -> &'static str;
}

/// Reject nodes that break the kind-dependent field invariants.
pub(crate) fn check_node(node: &FileNode) -> Result<(), StorageError> {
    node.validate().map_err(|reason| StorageError::InvalidNode {
        id: node.id,
        reason,
    })
}
