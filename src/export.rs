//! Export of stored payloads back to the filesystem.
//!
//! An `ExportTicket` grants one write of one node's payload. It is consumed by
//! `save_to` and released when dropped, so a ticket can neither be reused nor leak.

use crate::error::ApiError;
use crate::types::{FileNode, NodeId, Payload};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Issues export tickets and tracks how many are still alive.
#[derive(Debug, Default, Clone)]
pub struct Exporter {
    outstanding: Arc<AtomicUsize>,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a file node. Folders carry nothing to export.
    pub fn issue(&self, node: &FileNode) -> Result<ExportTicket, ApiError> {
        let payload = node.payload.clone().ok_or_else(|| ApiError::ExportFailed {
            path: PathBuf::from(&node.name),
            reason: format!("{} node has no payload", node.kind.as_str()),
        })?;
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        debug!(node_id = %node.id, "Export ticket issued");
        Ok(ExportTicket {
            node_id: node.id,
            name: node.name.clone(),
            payload,
            outstanding: Arc::clone(&self.outstanding),
        })
    }

    /// Tickets issued and neither used nor dropped.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

/// Single-use handle on one node's payload.
#[derive(Debug)]
pub struct ExportTicket {
    node_id: NodeId,
    name: String,
    payload: Payload,
    outstanding: Arc<AtomicUsize>,
}

impl ExportTicket {
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    /// Write the payload into `dir` under the node's name and return the final path.
    ///
    /// An existing file is never overwritten; `name (1).ext`, `name (2).ext`, ... are
    /// tried instead. The write goes to a temporary file that is renamed into place.
    pub async fn save_to(self, dir: &Path) -> Result<PathBuf, ApiError> {
        let export_err = |path: &Path, e: std::io::Error| ApiError::ExportFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| export_err(dir, e))?;

        let base = safe_file_name(&self.name);
        let target = available_path(dir, &base).await;
        let temp_path = dir.join(format!(".{}.{}.tmp", base, self.node_id.short()));

        tokio::fs::write(&temp_path, self.payload.as_bytes())
            .await
            .map_err(|e| export_err(&temp_path, e))?;
        if let Err(e) = tokio::fs::rename(&temp_path, &target).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(export_err(&target, e));
        }

        info!(node_id = %self.node_id, path = %target.display(), "Exported node");
        Ok(target)
    }

    /// Give the ticket back without writing anything.
    pub fn revoke(self) {}
}

impl Drop for ExportTicket {
    fn drop(&mut self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

fn safe_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "export".to_string())
}

async fn available_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if tokio::fs::symlink_metadata(&candidate).await.is_err() {
        return candidate;
    }

    let as_path = Path::new(name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    let ext = as_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{} ({}){}", stem, n, ext));
        if tokio::fs::symlink_metadata(&candidate).await.is_err() {
            return candidate;
        }
        n += 1;
    }
}
