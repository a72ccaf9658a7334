//! Error types for the CloudFlow local catalog.

use crate::types::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage quota exceeded: need {requested} bytes, {used} of {quota} bytes in use")]
    QuotaExceeded { requested: u64, used: u64, quota: u64 },

    #[error("Invalid node {id}: {reason}")]
    InvalidNode { id: NodeId, reason: String },

    #[error("Corrupt record for key {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Description service failures.
///
/// Never fatal: a node whose enrichment fails is simply left without an insight.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("Description service not configured: {0}")]
    NotConfigured(String),

    #[error("Description request failed: {0}")]
    RequestFailed(String),

    #[error("Description service authentication failed: {0}")]
    AuthFailed(String),

    #[error("Description service rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Invalid description response: {0}")]
    InvalidResponse(String),
}

impl EnrichmentError {
    /// Text shown in place of an insight when enrichment could not produce one.
    pub fn fallback_text(&self) -> &'static str {
        match self {
            EnrichmentError::NotConfigured(_) => "AI unavailable (API key not configured).",
            _ => "Analysis temporarily unavailable.",
        }
    }
}

/// Top-level errors surfaced by the catalog, ingestion, export and CLI layers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} already has an insight")]
    InsightAlreadySet(NodeId),

    #[error("Invalid node id: {0}")]
    InvalidNodeId(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Enrichment error: {0}")]
    EnrichmentError(#[from] EnrichmentError),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Export failed for {path}: {reason}")]
    ExportFailed { path: PathBuf, reason: String },

    #[error("Interactive prompt failed: {0}")]
    InteractionFailed(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
