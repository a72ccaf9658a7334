//! Ingestion
//!
//! Turns a drop or a file selection into catalog nodes: the walker flattens the input
//! into file handles, the service wraps each handle into a `FileNode` and persists it.

pub mod service;
pub mod walker;

pub use service::{IngestFailure, IngestOutcome, IngestService};
pub use walker::{
    DropEntry, EntryReadFailure, EntryReader, FileHandle, FolderEntry, FolderKey, FsEntryReader,
    IngestReport, Walker, WalkerConfig,
};

use serde::{Deserialize, Serialize};

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    /// Whether to follow symbolic links while walking dropped folders
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Entry names skipped during traversal (exact name match)
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Maximum folder depth below a dropped folder (None = unlimited)
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Recreate dropped folders as folder nodes instead of flattening
    #[serde(default)]
    pub preserve_folders: bool,

    /// Files larger than this are skipped before being read (None = unlimited)
    #[serde(default)]
    pub max_file_bytes: Option<u64>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
            max_depth: None,
            preserve_folders: false,
            max_file_bytes: None,
        }
    }
}

impl IngestConfig {
    /// Walker settings. A file bigger than the whole quota can never be stored, so the
    /// quota also caps `max_file_bytes`.
    pub fn walker_config(&self, quota_bytes: Option<u64>) -> WalkerConfig {
        let max_file_bytes = match (self.max_file_bytes, quota_bytes) {
            (Some(limit), Some(quota)) => Some(limit.min(quota)),
            (limit, quota) => limit.or(quota),
        };
        WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            ignore_patterns: self.ignore_patterns.clone(),
            max_depth: self.max_depth,
            max_file_bytes,
        }
    }
}
