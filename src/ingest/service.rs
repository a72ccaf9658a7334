//! Ingest service: wraps walked file handles into nodes and persists them.

use crate::catalog::Catalog;
use crate::enrich::Enricher;
use crate::ingest::walker::{EntryReadFailure, FolderKey, IngestReport};
use crate::types::{FileNode, NodeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// A node that could not be persisted. The rest of the batch went ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestFailure {
    pub name: String,
    pub reason: String,
}

/// Result of one ingestion batch.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Persisted nodes in creation order (folders before their contents).
    pub created: Vec<FileNode>,
    pub failed: Vec<IngestFailure>,
    /// Entries the walker could not read.
    pub warnings: Vec<EntryReadFailure>,
    pub enrichment_dispatched: usize,
}

impl IngestOutcome {
    pub fn files_created(&self) -> usize {
        self.created.iter().filter(|n| n.is_file()).count()
    }

    pub fn bytes_created(&self) -> u64 {
        self.created.iter().map(FileNode::counted_size).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.warnings.is_empty()
    }
}

pub struct IngestService {
    catalog: Arc<Catalog>,
    enricher: Option<Arc<Enricher>>,
    preserve_folders: bool,
}

impl IngestService {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            enricher: None,
            preserve_folders: false,
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn preserve_folders(mut self, preserve: bool) -> Self {
        self.preserve_folders = preserve;
        self
    }

    /// Persist every handle in the report, one node at a time.
    ///
    /// Each node is published only after its own write succeeded; a failure is
    /// recorded and the batch continues. Enrichment is dispatched for the files that
    /// made it into the catalog.
    pub async fn ingest(&self, report: IngestReport) -> IngestOutcome {
        let IngestReport {
            files,
            folders,
            warnings,
        } = report;
        let mut outcome = IngestOutcome {
            warnings,
            ..IngestOutcome::default()
        };

        // Folder entries arrive parents first, so a parent id is always known in time.
        let mut folder_ids: HashMap<FolderKey, NodeId> = HashMap::new();
        if self.preserve_folders {
            for folder in folders {
                let parent = folder
                    .parent()
                    .and_then(|p| folder_ids.get(&p))
                    .copied();
                let node = FileNode::folder(folder.name.clone(), parent);
                match self.catalog.insert(node).await {
                    Ok(stored) => {
                        folder_ids.insert(folder.key, stored.id);
                        outcome.created.push(stored);
                    }
                    Err(e) => {
                        warn!(folder = %folder.key.relative.display(), error = %e, "Folder not persisted");
                        outcome.failed.push(IngestFailure {
                            name: folder.key.relative.display().to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        let mut persisted_files = Vec::new();
        for handle in files {
            let parent = if self.preserve_folders {
                handle
                    .folder
                    .as_ref()
                    .and_then(|f| folder_ids.get(f))
                    .copied()
            } else {
                None
            };
            let node = FileNode::file(
                handle.name.clone(),
                Some(handle.mime_type),
                handle.payload,
                parent,
            );
            match self.catalog.insert(node).await {
                Ok(stored) => {
                    persisted_files.push(stored.clone());
                    outcome.created.push(stored);
                }
                Err(e) => {
                    warn!(file = %handle.name, error = %e, "File not persisted");
                    outcome.failed.push(IngestFailure {
                        name: handle.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Some(enricher) = &self.enricher {
            outcome.enrichment_dispatched = enricher.dispatch(&persisted_files);
        }

        info!(
            created = outcome.created.len(),
            failed = outcome.failed.len(),
            warnings = outcome.warnings.len(),
            "Ingestion finished"
        );
        outcome
    }
}
