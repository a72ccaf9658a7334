//! Ingest presentation: summary of an `add` batch.

use crate::ingest::IngestOutcome;
use crate::views::format_bytes;

pub fn format_ingest_outcome(outcome: &IngestOutcome) -> String {
    let files = outcome.files_created();
    let folders = outcome.created.len() - files;

    let mut out = format!(
        "Added {} file{} ({})",
        files,
        if files == 1 { "" } else { "s" },
        format_bytes(outcome.bytes_created())
    );
    if folders > 0 {
        out.push_str(&format!(" in {} folder{}", folders, if folders == 1 { "" } else { "s" }));
    }

    if !outcome.failed.is_empty() {
        out.push_str(&format!("\n\nNot stored ({}):", outcome.failed.len()));
        for failure in &outcome.failed {
            out.push_str(&format!("\n  - {}: {}", failure.name, failure.reason));
        }
    }
    if !outcome.warnings.is_empty() {
        out.push_str(&format!("\n\nSkipped unreadable entries ({}):", outcome.warnings.len()));
        for warning in &outcome.warnings {
            out.push_str(&format!("\n  - {}: {}", warning.path.display(), warning.reason));
        }
    }
    if outcome.enrichment_dispatched > 0 {
        out.push_str(&format!(
            "\n\nRequested descriptions for {} file{}",
            outcome.enrichment_dispatched,
            if outcome.enrichment_dispatched == 1 { "" } else { "s" }
        ));
    }
    out
}
