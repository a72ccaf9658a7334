//! Usage and status presentation.

use super::shared::format_section_heading;
use crate::catalog::UsageSummary;
use crate::views::format_bytes;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Serialize;
use std::path::PathBuf;

/// Snapshot shown by `status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub store_path: PathBuf,
    pub backend: String,
    pub degraded: bool,
    pub usage: UsageSummary,
    pub enrichment_enabled: bool,
    pub enrichment_configured: bool,
    pub enrichment_scope: String,
    pub preserve_folders: bool,
}

fn quota_label(quota: Option<u64>) -> String {
    quota.map(format_bytes).unwrap_or_else(|| "unlimited".to_string())
}

pub fn format_usage_text(usage: &UsageSummary) -> String {
    let mut out = format!("{}\n", format_section_heading("Storage"));
    out.push_str(&format!(
        "  {} of {} used ({:.4}%)\n",
        format_bytes(usage.used_bytes),
        quota_label(usage.quota_bytes),
        usage.percentage
    ));
    out.push_str(&format!(
        "  {} files, {} folders",
        usage.file_count, usage.folder_count
    ));
    out
}

pub fn format_status_text(report: &StatusReport) -> String {
    let mut out = format!("{}\n\n", format_section_heading("CloudFlow Status"));
    if report.degraded {
        out.push_str("  Local storage unavailable: changes will not be kept after exit.\n\n");
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec!["Store".to_string(), report.store_path.display().to_string()]);
    table.add_row(vec!["Backend".to_string(), report.backend.clone()]);
    table.add_row(vec![
        "Used".to_string(),
        format!(
            "{} of {}",
            format_bytes(report.usage.used_bytes),
            quota_label(report.usage.quota_bytes)
        ),
    ]);
    table.add_row(vec![
        "Entries".to_string(),
        format!(
            "{} files, {} folders",
            report.usage.file_count, report.usage.folder_count
        ),
    ]);
    let descriptions = match (report.enrichment_enabled, report.enrichment_configured) {
        (false, _) => "disabled".to_string(),
        (true, false) => "no provider configured".to_string(),
        (true, true) => format!("on ({} files)", report.enrichment_scope),
    };
    table.add_row(vec!["Descriptions".to_string(), descriptions]);
    table.add_row(vec![
        "Folders".to_string(),
        if report.preserve_folders {
            "preserved".to_string()
        } else {
            "flattened".to_string()
        },
    ]);
    out.push_str(&table.to_string());
    out
}
