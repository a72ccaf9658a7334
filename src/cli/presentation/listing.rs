//! Listing presentation: node tables and JSON rows.

use super::shared::{format_section_heading, format_timestamp, to_json};
use crate::error::ApiError;
use crate::types::FileNode;
use crate::views::format_node_size;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use serde_json::json;

pub fn format_listing_text(nodes: &[FileNode]) -> String {
    if nodes.is_empty() {
        return "No files stored yet.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Name", "Kind", "Size", "Added", "Insight"]);
    for node in nodes {
        table.add_row(vec![
            node.id.short(),
            node.name.clone(),
            node.kind.as_str().to_string(),
            format_node_size(node),
            format_timestamp(node.created_at),
            node.insight.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    format!("{}\n{} entries", table, nodes.len())
}

pub fn format_listing_json(nodes: &[FileNode]) -> Result<String, ApiError> {
    let rows: Vec<serde_json::Value> = nodes
        .iter()
        .map(|node| {
            json!({
                "id": node.id,
                "name": node.name,
                "kind": node.kind,
                "size": node.size,
                "size_display": format_node_size(node),
                "mime_type": node.mime_type,
                "parent_id": node.parent_id,
                "created_at": node.created_at,
                "insight": node.insight,
            })
        })
        .collect();
    to_json(&rows)
}

/// One node with its insight, for `describe`.
pub fn format_node_detail(node: &FileNode) -> String {
    let mut out = format!("{}\n", format_section_heading(&node.name));
    out.push_str(&format!("  ID: {}\n", node.id));
    out.push_str(&format!("  Kind: {}\n", node.kind.as_str()));
    out.push_str(&format!("  Size: {}\n", format_node_size(node)));
    if let Some(mime) = &node.mime_type {
        out.push_str(&format!("  Type: {}\n", mime));
    }
    out.push_str(&format!("  Added: {}\n", format_timestamp(node.created_at)));
    out.push_str(&format!(
        "  Insight: {}",
        node.insight.as_deref().unwrap_or("-")
    ));
    out
}
