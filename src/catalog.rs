//! Catalog
//!
//! The application's single view of every persisted node. A `Catalog` is built once at
//! startup, shared by `Arc`, and is the only writer to its `NodeStore`. The in-memory
//! map changes only after the matching store call has succeeded, so memory and storage
//! agree on the happy path and a failed write leaves no trace in either.

use crate::error::{ApiError, StorageError};
use crate::store::{check_node, MemoryNodeStore, NodeStore};
use crate::types::{FileNode, NodeId, NodeKind};
use crate::views::{listing, ListingPolicy};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Aggregate usage, derived from the catalog on request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub used_bytes: u64,
    pub quota_bytes: Option<u64>,
    /// Share of the quota in use, capped at 100. Zero when no quota is set.
    pub percentage: f64,
    pub file_count: usize,
    pub folder_count: usize,
}

pub struct Catalog {
    store: Arc<dyn NodeStore>,
    nodes: RwLock<HashMap<NodeId, FileNode>>,
    // Serializes mutations: one store call completes before the next one starts.
    writer: Mutex<()>,
    quota_bytes: Option<u64>,
    degraded: bool,
}

impl Catalog {
    /// Load the catalog from a store.
    pub async fn open(
        store: Arc<dyn NodeStore>,
        quota_bytes: Option<u64>,
    ) -> Result<Self, StorageError> {
        let loaded = store.list_all().await?;
        info!(
            backend = store.backend_name(),
            nodes = loaded.len(),
            "Catalog loaded"
        );
        let nodes = loaded.into_iter().map(|n| (n.id, n)).collect();
        Ok(Self {
            store,
            nodes: RwLock::new(nodes),
            writer: Mutex::new(()),
            quota_bytes,
            degraded: false,
        })
    }

    /// Empty catalog over an in-memory store, used when durable storage is unavailable.
    pub fn degraded(quota_bytes: Option<u64>) -> Self {
        Self {
            store: Arc::new(MemoryNodeStore::new()),
            nodes: RwLock::new(HashMap::new()),
            writer: Mutex::new(()),
            quota_bytes,
            degraded: true,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn quota_bytes(&self) -> Option<u64> {
        self.quota_bytes
    }

    /// Snapshot of every node, unordered.
    pub fn nodes(&self) -> Vec<FileNode> {
        self.nodes.read().values().cloned().collect()
    }

    pub fn get(&self, id: &NodeId) -> Option<FileNode> {
        self.nodes.read().get(id).cloned()
    }

    /// Nodes ordered and filtered for display.
    pub fn listing(&self, policy: &ListingPolicy) -> Vec<FileNode> {
        listing(self.nodes(), policy)
    }

    /// Ids whose hex form (dashes ignored) starts with `prefix`.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<NodeId> {
        let prefix = prefix.trim().to_ascii_lowercase().replace('-', "");
        if prefix.is_empty() {
            return Vec::new();
        }
        let mut ids: Vec<NodeId> = self
            .nodes
            .read()
            .keys()
            .filter(|id| id.to_string().replace('-', "").starts_with(&prefix))
            .copied()
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Total bytes held by file nodes. Folders count zero.
    pub fn usage(&self) -> u64 {
        self.nodes.read().values().map(FileNode::counted_size).sum()
    }

    pub fn summary(&self) -> UsageSummary {
        let nodes = self.nodes.read();
        let used_bytes: u64 = nodes.values().map(FileNode::counted_size).sum();
        let file_count = nodes.values().filter(|n| n.kind == NodeKind::File).count();
        let percentage = match self.quota_bytes {
            Some(quota) if quota > 0 => ((used_bytes as f64 / quota as f64) * 100.0).min(100.0),
            _ => 0.0,
        };
        UsageSummary {
            used_bytes,
            quota_bytes: self.quota_bytes,
            percentage,
            file_count,
            folder_count: nodes.len() - file_count,
        }
    }

    /// Persist a node (insert or replace) and then publish it in memory.
    ///
    /// A replacement keeps the stored `created_at` and any insight already attached.
    /// Returns the node as stored.
    pub async fn insert(&self, node: FileNode) -> Result<FileNode, ApiError> {
        let _guard = self.writer.lock().await;

        check_node(&node)?;
        let mut record = node;
        if let Some(existing) = self.get(&record.id) {
            record.created_at = existing.created_at;
            if record.insight.is_none() {
                record.insight = existing.insight;
            }
        }
        self.check_quota(&record)?;

        self.store.put(&record).await?;
        self.nodes.write().insert(record.id, record.clone());
        debug!(node_id = %record.id, name = %record.name, "Node published");
        Ok(record)
    }

    /// Attach an insight to a node that has none yet.
    pub async fn set_insight(&self, id: &NodeId, insight: String) -> Result<FileNode, ApiError> {
        let _guard = self.writer.lock().await;

        let mut node = self.get(id).ok_or(ApiError::NodeNotFound(*id))?;
        if node.insight.is_some() {
            return Err(ApiError::InsightAlreadySet(*id));
        }
        node.insight = Some(insight);

        self.store.put(&node).await?;
        self.nodes.write().insert(node.id, node.clone());
        Ok(node)
    }

    /// Remove a node. A folder takes its descendants with it.
    ///
    /// Unknown ids are a no-op. Returns how many nodes were removed.
    pub async fn remove(&self, id: &NodeId) -> Result<usize, ApiError> {
        let _guard = self.writer.lock().await;

        let doomed = self.subtree(id);
        if doomed.is_empty() {
            // Still clear any record the store holds that memory never saw.
            self.store.delete(id).await?;
            return Ok(0);
        }

        // Children first, so a failure never leaves a child pointing at a missing parent
        // that is still listed.
        let mut removed = 0;
        for node_id in doomed.iter().rev() {
            self.store.delete(node_id).await?;
            self.nodes.write().remove(node_id);
            removed += 1;
        }
        info!(node_id = %id, removed, "Removed nodes");
        Ok(removed)
    }

    /// Remove every node. Irreversible.
    pub async fn clear(&self) -> Result<usize, ApiError> {
        let _guard = self.writer.lock().await;

        let count = self.len();
        self.store.clear_all().await?;
        self.nodes.write().clear();
        warn!(removed = count, "Catalog cleared");
        Ok(count)
    }

    /// Flush the backing store.
    pub async fn flush(&self) -> Result<(), StorageError> {
        let _guard = self.writer.lock().await;
        self.store.flush().await
    }

    fn check_quota(&self, record: &FileNode) -> Result<(), StorageError> {
        let Some(quota) = self.quota_bytes else {
            return Ok(());
        };
        let nodes = self.nodes.read();
        let used = nodes
            .values()
            .map(FileNode::counted_size)
            .fold(0u64, u64::saturating_add);
        let replaced = nodes.get(&record.id).map(FileNode::counted_size).unwrap_or(0);
        let requested = record.counted_size();
        if used.saturating_sub(replaced).saturating_add(requested) > quota {
            return Err(StorageError::QuotaExceeded {
                requested,
                used,
                quota,
            });
        }
        Ok(())
    }

    /// The node and every descendant reachable through `parent_id`, parents before children.
    fn subtree(&self, root: &NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.read();
        if !nodes.contains_key(root) {
            return Vec::new();
        }

        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for node in nodes.values() {
            if let Some(parent) = node.parent_id {
                children.entry(parent).or_default().push(node.id);
            }
        }

        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([*root]);
        while let Some(id) = queue.pop_front() {
            // parent_id links are not checked for cycles
            if !seen.insert(id) {
                continue;
            }
            order.push(id);
            if let Some(kids) = children.get(&id) {
                queue.extend(kids.iter().copied());
            }
        }
        order
    }
}
