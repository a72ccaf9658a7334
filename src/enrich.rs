//! Enrichment: short natural-language descriptions of ingested files.
//!
//! Descriptions are requested after a node is durably stored. Each request runs as its
//! own tokio task; its only effect is a later `Catalog::set_insight`. A failed request
//! leaves the node without an insight and never touches anything else.

use crate::catalog::Catalog;
use crate::error::{ApiError, EnrichmentError};
use crate::provider::{
    ChatMessage, CompletionOptions, ModelProviderClient, ProviderConfig, ProviderFactory,
};
use crate::types::{FileNode, NodeId};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const SYSTEM_INSTRUCTION: &str = "You are an efficient and direct file organization assistant.";
const EMPTY_ANALYSIS: &str = "No analysis available.";
const DESCRIBE_TEMPERATURE: f32 = 0.2;

/// Describes a file from its metadata alone.
#[async_trait]
pub trait DescriptionService: Send + Sync {
    async fn describe(
        &self,
        name: &str,
        mime_type: &str,
        size_bytes: u64,
    ) -> Result<String, EnrichmentError>;

    fn is_configured(&self) -> bool {
        true
    }
}

/// Description service backed by a language-model provider.
pub struct ProviderDescriber {
    client: Box<dyn ModelProviderClient>,
}

impl ProviderDescriber {
    pub fn new(client: Box<dyn ModelProviderClient>) -> Self {
        Self { client }
    }

    pub fn prompt(name: &str, mime_type: &str, size_bytes: u64) -> String {
        format!(
            "Analyze this file and give a short summary (at most 15 words) of what it \
             probably is or what it is for, based on its name and type.\n\
             File: {}\nType: {}\nSize: {:.2} KB",
            name,
            mime_type,
            size_bytes as f64 / 1024.0
        )
    }
}

#[async_trait]
impl DescriptionService for ProviderDescriber {
    async fn describe(
        &self,
        name: &str,
        mime_type: &str,
        size_bytes: u64,
    ) -> Result<String, EnrichmentError> {
        let messages = vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::user(Self::prompt(name, mime_type, size_bytes)),
        ];
        let options = CompletionOptions {
            temperature: Some(DESCRIBE_TEMPERATURE),
            max_tokens: Some(128),
        };

        debug!(
            provider = self.client.provider_name(),
            model = self.client.model_name(),
            file = name,
            "Requesting description"
        );
        let response = self.client.complete(messages, options).await?;
        let text = response.content.trim();
        if text.is_empty() {
            Ok(EMPTY_ANALYSIS.to_string())
        } else {
            Ok(text.to_string())
        }
    }
}

/// Stand-in used when no provider is configured. Every call fails with `NotConfigured`.
pub struct UnconfiguredDescriber {
    reason: String,
}

impl UnconfiguredDescriber {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DescriptionService for UnconfiguredDescriber {
    async fn describe(&self, _: &str, _: &str, _: u64) -> Result<String, EnrichmentError> {
        Err(EnrichmentError::NotConfigured(self.reason.clone()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

/// Which freshly ingested files get a description request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentScope {
    /// Every file of the batch
    #[default]
    All,
    /// Only the last file of the batch
    Latest,
}

/// Enrichment configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub scope: EnrichmentScope,

    #[serde(default)]
    pub provider: Option<ProviderConfig>,
}

fn default_enabled() -> bool {
    true
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            scope: EnrichmentScope::All,
            provider: None,
        }
    }
}

impl EnrichmentConfig {
    /// Build the description service this configuration names.
    ///
    /// Anything short of a usable provider yields an `UnconfiguredDescriber`.
    pub fn build_service(&self) -> Arc<dyn DescriptionService> {
        let Some(provider) = &self.provider else {
            return Arc::new(UnconfiguredDescriber::new("no provider configured"));
        };
        let model_provider = match provider.to_model_provider() {
            Ok(p) => p,
            Err(e) => return Arc::new(UnconfiguredDescriber::new(e.to_string())),
        };
        match ProviderFactory::create_client(&model_provider) {
            Ok(client) => Arc::new(ProviderDescriber::new(client)),
            Err(e) => {
                warn!(error = %e, "Provider client unavailable");
                Arc::new(UnconfiguredDescriber::new(e.to_string()))
            }
        }
    }
}

/// Counts of finished enrichment tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub described: usize,
    pub failed: usize,
}

/// Fire-and-forget dispatcher of description requests.
pub struct Enricher {
    catalog: Arc<Catalog>,
    service: Arc<dyn DescriptionService>,
    scope: EnrichmentScope,
    tasks: Mutex<Vec<JoinHandle<bool>>>,
}

impl Enricher {
    pub fn new(
        catalog: Arc<Catalog>,
        service: Arc<dyn DescriptionService>,
        scope: EnrichmentScope,
    ) -> Self {
        Self {
            catalog,
            service,
            scope,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_configured()
    }

    /// Spawn one description task per selected file. Must run inside a tokio runtime.
    ///
    /// Returns how many tasks were started.
    pub fn dispatch(&self, nodes: &[FileNode]) -> usize {
        let files: Vec<&FileNode> = nodes.iter().filter(|n| n.is_file()).collect();
        let selected: Vec<&FileNode> = match self.scope {
            EnrichmentScope::All => files,
            EnrichmentScope::Latest => files.last().copied().into_iter().collect(),
        };

        let mut tasks = self.tasks.lock();
        for node in &selected {
            let catalog = Arc::clone(&self.catalog);
            let service = Arc::clone(&self.service);
            let node = (*node).clone();
            tasks.push(tokio::spawn(async move {
                match enrich_node(&catalog, service.as_ref(), &node).await {
                    Ok(_) => true,
                    Err(e) => {
                        log_failure(&node.id, &e);
                        false
                    }
                }
            }));
        }
        selected.len()
    }

    /// Tasks started and not yet awaited.
    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Await every dispatched task.
    pub async fn wait(&self) -> EnrichmentSummary {
        let handles: Vec<_> = std::mem::take(&mut *self.tasks.lock());
        let mut summary = EnrichmentSummary::default();
        for result in futures::future::join_all(handles).await {
            match result {
                Ok(true) => summary.described += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    warn!(error = %e, "Enrichment task aborted");
                    summary.failed += 1;
                }
            }
        }
        if summary.described + summary.failed > 0 {
            info!(
                described = summary.described,
                failed = summary.failed,
                "Enrichment finished"
            );
        }
        summary
    }

    /// Describe one node right away and attach the result.
    pub async fn describe_now(&self, id: &NodeId) -> Result<FileNode, ApiError> {
        let node = self
            .catalog
            .get(id)
            .ok_or(ApiError::NodeNotFound(*id))?;
        enrich_node(&self.catalog, self.service.as_ref(), &node).await
    }
}

async fn enrich_node(
    catalog: &Catalog,
    service: &dyn DescriptionService,
    node: &FileNode,
) -> Result<FileNode, ApiError> {
    let mime = node
        .mime_type
        .as_deref()
        .unwrap_or("application/octet-stream");
    let insight = service
        .describe(&node.name, mime, node.size.unwrap_or(0))
        .await?;
    let updated = catalog.set_insight(&node.id, insight).await?;
    debug!(node_id = %node.id, "Insight attached");
    Ok(updated)
}

fn log_failure(id: &NodeId, err: &ApiError) {
    match err {
        ApiError::EnrichmentError(EnrichmentError::NotConfigured(_)) => {
            debug!(node_id = %id, error = %err, "Enrichment skipped")
        }
        // Removed or already described in the meantime.
        ApiError::NodeNotFound(_) | ApiError::InsightAlreadySet(_) => {
            debug!(node_id = %id, error = %err, "Enrichment result dropped")
        }
        _ => warn!(node_id = %id, error = %err, "Enrichment failed"),
    }
}
