//! Core domain types: node identifiers, payloads and the persisted `FileNode` record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque node identifier, generated once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Storage key for this id.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        Uuid::from_slice(bytes).ok().map(Self)
    }

    /// First eight hex characters, for compact listings.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Folder => "folder",
        }
    }
}

/// Raw binary content of a file node.
///
/// Cheap to clone; the bytes are shared, never copied into a second blob.
#[derive(Clone, PartialEq, Eq)]
pub struct Payload(Arc<Vec<u8>>);

impl Payload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Arc::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> u64 {
        self.0.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payload({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

/// FileNode: the persisted catalog record for one file or folder.
///
/// The payload travels with the node in memory but is stored as a separate blob,
/// so it is skipped when the metadata record is serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub size: Option<u64>,
    pub mime_type: Option<String>,
    pub parent_id: Option<NodeId>,
    #[serde(skip)]
    pub payload: Option<Payload>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub insight: Option<String>,
}

impl FileNode {
    /// New file node with a generated id; size is taken from the payload.
    pub fn file(
        name: impl Into<String>,
        mime_type: Option<String>,
        payload: Payload,
        parent_id: Option<NodeId>,
    ) -> Self {
        Self {
            id: NodeId::generate(),
            name: name.into(),
            kind: NodeKind::File,
            size: Some(payload.len()),
            mime_type,
            parent_id,
            payload: Some(payload),
            created_at: now_millis(),
            insight: None,
        }
    }

    /// New folder node with a generated id.
    pub fn folder(name: impl Into<String>, parent_id: Option<NodeId>) -> Self {
        Self {
            id: NodeId::generate(),
            name: name.into(),
            kind: NodeKind::Folder,
            size: None,
            mime_type: None,
            parent_id,
            payload: None,
            created_at: now_millis(),
            insight: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    /// Bytes this node contributes to aggregate usage.
    pub fn counted_size(&self) -> u64 {
        match self.kind {
            NodeKind::File => self.size.unwrap_or(0),
            NodeKind::Folder => 0,
        }
    }

    /// Check the kind-dependent field invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self.kind {
            NodeKind::File => {
                let Some(payload) = &self.payload else {
                    return Err("file node has no payload".to_string());
                };
                if self.size != Some(payload.len()) {
                    return Err(format!(
                        "file size {:?} does not match its {}-byte payload",
                        self.size,
                        payload.len()
                    ));
                }
            }
            NodeKind::Folder => {
                if self.payload.is_some() {
                    return Err("folder node carries a payload".to_string());
                }
                if self.size.is_some() {
                    return Err("folder node carries a size".to_string());
                }
                if self.mime_type.is_some() {
                    return Err("folder node carries a content type".to_string());
                }
            }
        }
        if self.name.is_empty() {
            return Err("node name is empty".to_string());
        }
        Ok(())
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
