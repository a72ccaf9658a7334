//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, StorageError};
use crate::views::format_bytes;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::StorageError(StorageError::QuotaExceeded {
            requested,
            used,
            quota,
        }) => format!(
            "Not enough space: {} requested, {} of {} in use",
            format_bytes(*requested),
            format_bytes(*used),
            format_bytes(*quota)
        ),
        ApiError::StorageError(StorageError::StorageUnavailable(reason)) => {
            format!("Local storage is unavailable: {}", reason)
        }
        ApiError::NodeNotFound(id) => format!("No entry with id {}", id),
        ApiError::EnrichmentError(err) => {
            format!("{} ({})", err.fallback_text(), err)
        }
        other => other.to_string(),
    }
}
