//! Listing Views
//!
//! Orders the catalog's nodes for display. Every ordering is total (ties fall back to
//! the node id), so the same catalog always lists the same way.

use crate::types::{FileNode, NodeKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort key for listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Display name, case-insensitive
    #[default]
    Name,
    /// Byte size (folders count zero)
    Size,
    /// Creation time
    Created,
    /// Folders before files
    Kind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Listing policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ListingPolicy {
    pub sort: SortKey,
    pub order: SortOrder,
    /// Restrict to one kind
    pub kind: Option<NodeKind>,
    /// Maximum number of rows (None = all)
    pub limit: Option<usize>,
}

impl ListingPolicy {
    pub fn sorted_by(sort: SortKey, order: SortOrder) -> Self {
        Self {
            sort,
            order,
            ..Self::default()
        }
    }
}

/// Apply a listing policy to a node snapshot.
pub fn listing(mut nodes: Vec<FileNode>, policy: &ListingPolicy) -> Vec<FileNode> {
    if let Some(kind) = policy.kind {
        nodes.retain(|n| n.kind == kind);
    }

    nodes.sort_by(|a, b| {
        let primary = compare(a, b, policy.sort);
        let primary = match policy.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    });

    if let Some(limit) = policy.limit {
        nodes.truncate(limit);
    }
    nodes
}

fn compare(a: &FileNode, b: &FileNode, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
        SortKey::Size => a.counted_size().cmp(&b.counted_size()),
        SortKey::Created => a.created_at.cmp(&b.created_at),
        SortKey::Kind => kind_rank(a.kind).cmp(&kind_rank(b.kind)),
    }
}

fn kind_rank(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Folder => 0,
        NodeKind::File => 1,
    }
}

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable byte count in binary units.
///
/// Rounded to two decimals with trailing zeros dropped: `0 B`, `100 B`, `1.5 KB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Size column for a node: `--` for folders.
pub fn format_node_size(node: &FileNode) -> String {
    match (node.kind, node.size) {
        (NodeKind::File, Some(size)) => format_bytes(size),
        (NodeKind::File, None) => format_bytes(0),
        (NodeKind::Folder, _) => "--".to_string(),
    }
}
