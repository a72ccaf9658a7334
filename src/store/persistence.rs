//! Persistence layer for the node store
//!
//! Two sled trees share one database: `nodes` holds bincode-encoded metadata records and
//! `payloads` holds the raw file bytes, both keyed by the 16-byte node id. Writes and
//! deletes touch both trees inside a single sled transaction.

use crate::error::StorageError;
use crate::store::{check_node, NodeStore};
use crate::types::{FileNode, NodeId, NodeKind, Payload};
use async_trait::async_trait;
use sled::transaction::{ConflictableTransactionError, TransactionError, Transactional};
use sled::{Db, Tree};
use std::path::Path;
use tracing::{debug, warn};

const TREE_NODES: &str = "nodes";
const TREE_PAYLOADS: &str = "payloads";

/// Sled-based implementation of NodeStore
#[derive(Clone)]
pub struct SledNodeStore {
    db: Db,
    nodes: Tree,
    payloads: Tree,
}

impl SledNodeStore {
    /// Open (or create) a store at the given directory.
    ///
    /// Payload blobs left behind without a metadata record are swept on open.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            StorageError::StorageUnavailable(format!(
                "Failed to open sled database at {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_db(db)
    }

    pub fn from_db(db: Db) -> Result<Self, StorageError> {
        let nodes = db.open_tree(TREE_NODES).map_err(to_storage_err)?;
        let payloads = db.open_tree(TREE_PAYLOADS).map_err(to_storage_err)?;
        let store = Self {
            db,
            nodes,
            payloads,
        };
        let swept = store.sweep_orphans()?;
        if swept > 0 {
            warn!(swept, "Removed orphaned payload blobs");
        }
        Ok(store)
    }

    /// Remove payload blobs whose metadata record is missing. Returns the count removed.
    pub fn sweep_orphans(&self) -> Result<usize, StorageError> {
        let mut orphans = Vec::new();
        for item in self.payloads.iter() {
            let (key, _) = item.map_err(to_storage_err)?;
            if !self.nodes.contains_key(&key).map_err(to_storage_err)? {
                orphans.push(key);
            }
        }
        for key in &orphans {
            self.payloads.remove(key).map_err(to_storage_err)?;
        }
        Ok(orphans.len())
    }

    /// Number of stored payload blobs.
    pub fn payload_count(&self) -> usize {
        self.payloads.len()
    }

    /// Flush all pending writes to disk
    pub fn flush_blocking(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(to_storage_err)?;
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<FileNode>, StorageError> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for item in self.nodes.iter() {
            let (key, value) = item.map_err(to_storage_err)?;
            out.push(self.hydrate(&key, &value)?);
        }
        Ok(out)
    }

    fn read_one(&self, id: &NodeId) -> Result<Option<FileNode>, StorageError> {
        let key = id.as_bytes();
        match self.nodes.get(key).map_err(to_storage_err)? {
            Some(value) => Ok(Some(self.hydrate(key, &value)?)),
            None => Ok(None),
        }
    }

    /// Decode a metadata record and attach its payload blob.
    fn hydrate(&self, key: &[u8], value: &[u8]) -> Result<FileNode, StorageError> {
        let mut node = decode_record(key, value)?;
        if node.kind == NodeKind::File {
            let blob = self.payloads.get(key).map_err(to_storage_err)?.ok_or_else(|| {
                StorageError::Corrupt {
                    key: key_label(key),
                    reason: "file record has no payload blob".to_string(),
                }
            })?;
            node.payload = Some(Payload::new(blob.to_vec()));
        }
        Ok(node)
    }

    fn write(&self, node: &FileNode) -> Result<(), StorageError> {
        check_node(node)?;
        let key = node.id.as_bytes();
        let blob = node.payload.as_ref().map(|p| p.as_bytes().to_vec());

        let result = (&self.nodes, &self.payloads).transaction(|(nodes, payloads)| {
            let mut record = node.clone();
            if let Some(previous) = nodes.get(key)? {
                let previous = decode_record(key, &previous)
                    .map_err(|e| ConflictableTransactionError::Abort(e.to_string()))?;
                record.created_at = previous.created_at;
            }
            let encoded = bincode::serialize(&record)
                .map_err(|e| ConflictableTransactionError::Abort(e.to_string()))?;
            nodes.insert(&key[..], encoded)?;
            match &blob {
                Some(bytes) => {
                    payloads.insert(&key[..], bytes.as_slice())?;
                }
                None => {
                    payloads.remove(&key[..])?;
                }
            }
            Ok(())
        });

        map_transaction(result, key)?;
        debug!(node_id = %node.id, name = %node.name, "Stored node");
        Ok(())
    }

    fn remove(&self, id: &NodeId) -> Result<(), StorageError> {
        let key = id.as_bytes();
        let result = (&self.nodes, &self.payloads).transaction(|(nodes, payloads)| {
            nodes.remove(&key[..])?;
            payloads.remove(&key[..])?;
            Ok::<(), ConflictableTransactionError<String>>(())
        });
        map_transaction(result, key)
    }

    fn remove_everything(&self) -> Result<(), StorageError> {
        let mut keys = Vec::new();
        for item in self.nodes.iter().keys().chain(self.payloads.iter().keys()) {
            keys.push(item.map_err(to_storage_err)?);
        }
        let result = (&self.nodes, &self.payloads).transaction(|(nodes, payloads)| {
            for key in &keys {
                nodes.remove(key.clone())?;
                payloads.remove(key.clone())?;
            }
            Ok::<(), ConflictableTransactionError<String>>(())
        });
        map_transaction(result, b"*")?;
        self.flush_blocking()
    }
}

#[async_trait]
impl NodeStore for SledNodeStore {
    async fn list_all(&self) -> Result<Vec<FileNode>, StorageError> {
        let store = self.clone();
        run_blocking(move || store.read_all()).await
    }

    async fn get(&self, id: &NodeId) -> Result<Option<FileNode>, StorageError> {
        let store = self.clone();
        let id = *id;
        run_blocking(move || store.read_one(&id)).await
    }

    async fn put(&self, node: &FileNode) -> Result<(), StorageError> {
        let store = self.clone();
        let node = node.clone();
        run_blocking(move || store.write(&node)).await
    }

    async fn delete(&self, id: &NodeId) -> Result<(), StorageError> {
        let store = self.clone();
        let id = *id;
        run_blocking(move || store.remove(&id)).await
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        let store = self.clone();
        run_blocking(move || store.remove_everything()).await
    }

    async fn flush(&self) -> Result<(), StorageError> {
        let store = self.clone();
        run_blocking(move || store.flush_blocking()).await
    }

    fn backend_name(&self) -> &'static str {
        "sled"
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        StorageError::StorageUnavailable(format!("Storage task did not complete: {}", e))
    })?
}

fn decode_record(key: &[u8], value: &[u8]) -> Result<FileNode, StorageError> {
    bincode::deserialize(value).map_err(|e| StorageError::Corrupt {
        key: key_label(key),
        reason: format!("Failed to deserialize node record: {}", e),
    })
}

fn key_label(key: &[u8]) -> String {
    NodeId::from_slice(key)
        .map(|id| id.to_string())
        .unwrap_or_else(|| String::from_utf8_lossy(key).into_owned())
}

fn map_transaction(
    result: Result<(), TransactionError<String>>,
    key: &[u8],
) -> Result<(), StorageError> {
    match result {
        Ok(()) => Ok(()),
        Err(TransactionError::Abort(reason)) => Err(StorageError::Corrupt {
            key: key_label(key),
            reason,
        }),
        Err(TransactionError::Storage(e)) => Err(to_storage_err(e)),
    }
}

fn to_storage_err(err: sled::Error) -> StorageError {
    match err {
        sled::Error::Io(e) => StorageError::IoError(e),
        sled::Error::Corruption { .. } => StorageError::Corrupt {
            key: "*".to_string(),
            reason: "sled reported corruption".to_string(),
        },
        other => StorageError::StorageUnavailable(other.to_string()),
    }
}
