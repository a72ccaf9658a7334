//! Ingestion walker: flattens a drop into file handles.
//!
//! Dropped folders are walked depth-first (pre-order, children in name order) with an
//! explicit work stack, so arbitrarily deep trees never grow the call stack. A failed
//! read skips that one entry and records a warning; its siblings are still visited.
//! Each file is read whole, so `max_file_bytes` is checked against its metadata first.

use crate::types::Payload;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One entry of a drop: a file or a folder reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropEntry {
    File(PathBuf),
    Directory(PathBuf),
}

impl DropEntry {
    pub fn path(&self) -> &Path {
        match self {
            DropEntry::File(path) | DropEntry::Directory(path) => path,
        }
    }
}

/// A file read during ingestion, ready to become a node.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub payload: Payload,
    pub source: PathBuf,
    /// Containing folder; `None` for files dropped directly.
    pub folder: Option<FolderKey>,
}

/// Identifies a folder within one walk.
///
/// `root` is the index of the dropped entry the folder was reached from, so two
/// dropped folders with the same name never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderKey {
    pub root: usize,
    /// Path below the drop, starting with the dropped folder's own name.
    pub relative: PathBuf,
}

impl FolderKey {
    pub fn new(root: usize, relative: impl Into<PathBuf>) -> Self {
        Self {
            root,
            relative: relative.into(),
        }
    }

    /// Key of the enclosing folder, if this folder is not a drop root.
    pub fn parent(&self) -> Option<FolderKey> {
        self.relative
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| FolderKey::new(self.root, p))
    }

    fn child(&self, name: &str) -> FolderKey {
        FolderKey::new(self.root, self.relative.join(name))
    }
}

/// A folder met during traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub key: FolderKey,
    pub name: String,
}

impl FolderEntry {
    pub fn parent(&self) -> Option<FolderKey> {
        self.key.parent()
    }
}

/// An entry that could not be read. Traversal continued without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReadFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one walk: everything that could be read, plus warnings.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub files: Vec<FileHandle>,
    pub folders: Vec<FolderEntry>,
    pub warnings: Vec<EntryReadFailure>,
}

impl IngestReport {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// Source of entries. Every call may suspend.
#[async_trait]
pub trait EntryReader: Send + Sync {
    /// Classify a path. `None` means the entry is skipped (symlink, socket, ...).
    async fn classify(&self, path: &Path) -> io::Result<Option<DropEntry>>;

    /// Immediate children of a directory.
    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Size in bytes, without reading the content.
    async fn file_size(&self, path: &Path) -> io::Result<u64>;

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads the local filesystem through tokio.
#[derive(Debug, Clone, Default)]
pub struct FsEntryReader {
    follow_symlinks: bool,
}

impl FsEntryReader {
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }
}

#[async_trait]
impl EntryReader for FsEntryReader {
    async fn classify(&self, path: &Path) -> io::Result<Option<DropEntry>> {
        let link_meta = tokio::fs::symlink_metadata(path).await?;
        let meta = if link_meta.file_type().is_symlink() {
            if !self.follow_symlinks {
                debug!(path = %path.display(), "Skipping symlink");
                return Ok(None);
            }
            tokio::fs::metadata(path).await?
        } else {
            link_meta
        };

        if meta.is_file() {
            Ok(Some(DropEntry::File(path.to_path_buf())))
        } else if meta.is_dir() {
            Ok(Some(DropEntry::Directory(path.to_path_buf())))
        } else {
            Ok(None)
        }
    }

    async fn read_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut children = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            children.push(entry.path());
        }
        Ok(children)
    }

    async fn file_size(&self, path: &Path) -> io::Result<u64> {
        Ok(tokio::fs::metadata(path).await?.len())
    }

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}

/// Walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false)
    pub follow_symlinks: bool,
    /// Entry names to skip
    pub ignore_patterns: Vec<String>,
    /// Folder levels to descend below a dropped folder (None = unlimited)
    pub max_depth: Option<usize>,
    /// Files larger than this are skipped unread (None = no limit)
    pub max_file_bytes: Option<u64>,
}

struct Pending {
    entry: DropEntry,
    /// Index of the dropped entry this one descends from.
    root: usize,
    /// Folder holding this entry.
    folder: Option<FolderKey>,
    depth: usize,
}

/// Ingestion walker
pub struct Walker<R: EntryReader = FsEntryReader> {
    reader: R,
    config: WalkerConfig,
}

impl Walker<FsEntryReader> {
    /// Walker over the local filesystem
    pub fn new(config: WalkerConfig) -> Self {
        Self {
            reader: FsEntryReader::new(config.follow_symlinks),
            config,
        }
    }
}

impl<R: EntryReader> Walker<R> {
    pub fn with_reader(reader: R, config: WalkerConfig) -> Self {
        Self { reader, config }
    }

    /// Walk dropped paths, classifying each one first.
    pub async fn walk_paths(&self, paths: &[PathBuf]) -> IngestReport {
        let mut report = IngestReport::default();
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            match self.reader.classify(path).await {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => record_failure(&mut report, path, &e),
            }
        }
        self.walk_into(entries, &mut report).await;
        report
    }

    /// Walk already-classified drop entries.
    pub async fn walk_drop(&self, entries: Vec<DropEntry>) -> IngestReport {
        let mut report = IngestReport::default();
        self.walk_into(entries, &mut report).await;
        report
    }

    /// Read a plain file selection. No folder traversal happens here.
    pub async fn walk_selection(&self, files: &[PathBuf]) -> IngestReport {
        let mut report = IngestReport::default();
        for path in files {
            if self.is_ignored(path) {
                continue;
            }
            self.read_into(path, None, &mut report).await;
        }
        report
    }

    async fn walk_into(&self, entries: Vec<DropEntry>, report: &mut IngestReport) {
        let mut stack: Vec<Pending> = entries
            .into_iter()
            .enumerate()
            .rev()
            .map(|(root, entry)| Pending {
                entry,
                root,
                folder: None,
                depth: 0,
            })
            .collect();

        while let Some(pending) = stack.pop() {
            let path = pending.entry.path().to_path_buf();
            if self.is_ignored(&path) {
                debug!(path = %path.display(), "Ignored entry");
                continue;
            }

            match pending.entry {
                DropEntry::File(_) => {
                    self.read_into(&path, pending.folder, report).await;
                }
                DropEntry::Directory(_) => {
                    let name = entry_name(&path);
                    let key = match &pending.folder {
                        Some(parent) => parent.child(&name),
                        None => FolderKey::new(pending.root, &name),
                    };

                    let children = match self.reader.read_dir(&path).await {
                        Ok(children) => children,
                        Err(e) => {
                            record_failure(report, &path, &e);
                            continue;
                        }
                    };
                    report.folders.push(FolderEntry {
                        key: key.clone(),
                        name,
                    });

                    let child_depth = pending.depth + 1;
                    if self.config.max_depth.is_some_and(|max| child_depth > max) {
                        debug!(path = %path.display(), "Depth limit reached");
                        continue;
                    }

                    let mut classified = Vec::with_capacity(children.len());
                    for child in children {
                        match self.reader.classify(&child).await {
                            Ok(Some(entry)) => classified.push(entry),
                            Ok(None) => {}
                            Err(e) => record_failure(report, &child, &e),
                        }
                    }
                    classified.sort_by(|a, b| a.path().file_name().cmp(&b.path().file_name()));

                    // Reverse push so the first name is popped first.
                    for entry in classified.into_iter().rev() {
                        stack.push(Pending {
                            entry,
                            root: pending.root,
                            folder: Some(key.clone()),
                            depth: child_depth,
                        });
                    }
                }
            }
        }
    }

    async fn read_into(
        &self,
        path: &Path,
        folder: Option<FolderKey>,
        report: &mut IngestReport,
    ) {
        if let Some(max) = self.config.max_file_bytes {
            match self.reader.file_size(path).await {
                Ok(size) if size > max => {
                    let err = io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("{} bytes exceeds the {} byte file limit", size, max),
                    );
                    record_failure(report, path, &err);
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    record_failure(report, path, &e);
                    return;
                }
            }
        }

        match self.reader.read_file(path).await {
            Ok(bytes) => {
                let payload = Payload::new(bytes);
                report.files.push(FileHandle {
                    name: entry_name(path),
                    size: payload.len(),
                    mime_type: guess_mime_type(path),
                    payload,
                    source: path.to_path_buf(),
                    folder,
                });
            }
            Err(e) => record_failure(report, path, &e),
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        self.config
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.as_str() == name)
    }
}

/// Content type guessed from the file extension.
pub fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn record_failure(report: &mut IngestReport, path: &Path, err: &io::Error) {
    warn!(path = %path.display(), error = %err, "Skipping unreadable entry");
    report.warnings.push(EntryReadFailure {
        path: path.to_path_buf(),
        reason: err.to_string(),
    });
}
