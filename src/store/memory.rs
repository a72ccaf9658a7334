//! In-memory node store.
//!
//! Backs the degraded mode used when the durable store cannot be opened. Nothing
//! survives the process.

use crate::error::StorageError;
use crate::store::{check_node, NodeStore};
use crate::types::{FileNode, NodeId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryNodeStore {
    nodes: Mutex<HashMap<NodeId, FileNode>>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.lock().is_empty()
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn list_all(&self) -> Result<Vec<FileNode>, StorageError> {
        Ok(self.nodes.lock().values().cloned().collect())
    }

    async fn get(&self, id: &NodeId) -> Result<Option<FileNode>, StorageError> {
        Ok(self.nodes.lock().get(id).cloned())
    }

    async fn put(&self, node: &FileNode) -> Result<(), StorageError> {
        check_node(node)?;
        let mut nodes = self.nodes.lock();
        let mut record = node.clone();
        if let Some(previous) = nodes.get(&node.id) {
            record.created_at = previous.created_at;
        }
        nodes.insert(record.id, record);
        Ok(())
    }

    async fn delete(&self, id: &NodeId) -> Result<(), StorageError> {
        self.nodes.lock().remove(id);
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        self.nodes.lock().clear();
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
