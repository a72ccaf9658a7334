//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::catalog::Catalog;
use crate::cli::help::{command_name, is_mutating};
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_ingest_outcome, format_listing_json, format_listing_text, format_node_detail,
    format_status_text, format_usage_text, to_json, StatusReport,
};
use crate::config::{CloudflowConfig, ConfigLoader};
use crate::enrich::{EnrichmentScope, Enricher};
use crate::error::{ApiError, StorageError};
use crate::export::Exporter;
use crate::ingest::{IngestService, Walker};
use crate::store::SledNodeStore;
use crate::types::{NodeId, NodeKind};
use crate::views::{ListingPolicy, SortKey, SortOrder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runtime context for CLI execution: configuration, the catalog and its services.
/// Built once per invocation from the workspace path and optional config path.
pub struct RunContext {
    config: CloudflowConfig,
    catalog: Arc<Catalog>,
    enricher: Arc<Enricher>,
    exporter: Exporter,
    store_path: PathBuf,
    degraded_reason: Option<String>,
}

impl RunContext {
    /// Load configuration and open the catalog.
    pub async fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = match config_path {
            Some(ref cfg_path) => ConfigLoader::load_from_file(cfg_path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Self::from_config(config.validated()?).await
    }

    /// Open the catalog described by an already loaded configuration.
    ///
    /// When the durable store cannot be opened the context falls back to an in-memory
    /// catalog; `degraded_notice` then says why.
    pub async fn from_config(config: CloudflowConfig) -> Result<Self, ApiError> {
        let store_path = config.storage.resolve_path();
        let quota = config.storage.quota_bytes;

        let (catalog, degraded_reason) = match open_store(&store_path).await {
            Ok(store) => (Catalog::open(Arc::new(store), quota).await?, None),
            Err(StorageError::StorageUnavailable(reason)) => {
                warn!(store = %store_path.display(), %reason, "Falling back to in-memory catalog");
                (Catalog::degraded(quota), Some(reason))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self::assemble(config, Arc::new(catalog), store_path, degraded_reason))
    }

    fn assemble(
        config: CloudflowConfig,
        catalog: Arc<Catalog>,
        store_path: PathBuf,
        degraded_reason: Option<String>,
    ) -> Self {
        let enricher = Arc::new(Enricher::new(
            Arc::clone(&catalog),
            config.enrichment.build_service(),
            config.enrichment.scope,
        ));

        Self {
            config,
            catalog,
            enricher,
            exporter: Exporter::new(),
            store_path,
            degraded_reason,
        }
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Message for the user when running without durable storage.
    pub fn degraded_notice(&self) -> Option<String> {
        self.degraded_reason.as_ref().map(|reason| {
            format!(
                "Warning: local storage unavailable ({}); changes will not be kept.",
                reason
            )
        })
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        debug!(command = command_name(command), "Executing command");
        let output = self.execute_inner(command).await?;
        if is_mutating(command) {
            self.catalog.flush().await?;
        }
        Ok(output)
    }

    async fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Add {
                paths,
                selection,
                no_enrich,
                preserve_folders,
            } => {
                self.handle_add(paths, *selection, *no_enrich, *preserve_folders)
                    .await
            }
            Commands::List {
                sort,
                desc,
                kind,
                limit,
                format,
            } => {
                let policy = ListingPolicy {
                    sort: parse_sort_key(sort)?,
                    order: if *desc { SortOrder::Desc } else { SortOrder::Asc },
                    kind: kind.as_deref().map(parse_kind).transpose()?,
                    limit: *limit,
                };
                let nodes = self.catalog.listing(&policy);
                if format == "json" {
                    format_listing_json(&nodes)
                } else {
                    Ok(format_listing_text(&nodes))
                }
            }
            Commands::Remove { id } => {
                let id = self.resolve_id(id)?;
                let removed = self.catalog.remove(&id).await?;
                Ok(match removed {
                    0 => format!("Nothing to remove for {}", id),
                    1 => format!("Removed {}", id),
                    n => format!("Removed {} and {} nested entries", id, n - 1),
                })
            }
            Commands::Clear { yes } => self.handle_clear(*yes).await,
            Commands::Export { id, output } => {
                let id = self.resolve_id(id)?;
                let node = self.catalog.get(&id).ok_or(ApiError::NodeNotFound(id))?;
                let ticket = self.exporter.issue(&node)?;
                let path = ticket.save_to(output).await?;
                Ok(format!("Exported {} to {}", node.name, path.display()))
            }
            Commands::Usage { format } => {
                let summary = self.catalog.summary();
                if format == "json" {
                    to_json(&summary)
                } else {
                    Ok(format_usage_text(&summary))
                }
            }
            Commands::Describe { id } => {
                let id = self.resolve_id(id)?;
                let node = self.catalog.get(&id).ok_or(ApiError::NodeNotFound(id))?;
                if node.insight.is_some() {
                    return Ok(format_node_detail(&node));
                }
                let updated = self.enricher.describe_now(&id).await?;
                Ok(format_node_detail(&updated))
            }
            Commands::Status { format } => {
                let report = self.status_report();
                if format == "json" {
                    to_json(&report)
                } else {
                    Ok(format_status_text(&report))
                }
            }
        }
    }

    async fn handle_add(
        &self,
        paths: &[PathBuf],
        selection: bool,
        no_enrich: bool,
        preserve_folders: bool,
    ) -> Result<String, ApiError> {
        let ingest = &self.config.ingest;
        let walker = Walker::new(ingest.walker_config(self.catalog.quota_bytes()));
        let report = if selection {
            walker.walk_selection(paths).await
        } else {
            walker.walk_paths(paths).await
        };
        info!(
            files = report.files.len(),
            bytes = report.total_bytes(),
            warnings = report.warnings.len(),
            "Walk finished"
        );

        let mut service = IngestService::new(Arc::clone(&self.catalog))
            .preserve_folders(preserve_folders || ingest.preserve_folders);
        let enrich = self.config.enrichment.enabled && !no_enrich && self.enricher.is_configured();
        if enrich {
            service = service.with_enricher(Arc::clone(&self.enricher));
        }

        let outcome = service.ingest(report).await;
        let mut out = format_ingest_outcome(&outcome);

        // Descriptions must land before the process exits.
        if enrich {
            let summary = self.enricher.wait().await;
            if summary.described > 0 {
                out.push_str(&format!("\nDescribed {} file(s)", summary.described));
            }
            if summary.failed > 0 {
                out.push_str(&format!(
                    "\n{} description(s) unavailable",
                    summary.failed
                ));
            }
        }
        Ok(out)
    }

    async fn handle_clear(&self, yes: bool) -> Result<String, ApiError> {
        if !yes {
            use dialoguer::Confirm;
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Remove all {} entries? This cannot be undone.",
                    self.catalog.len()
                ))
                .default(false)
                .interact()
                .map_err(|e| {
                    ApiError::InteractionFailed(format!("Failed to get user input: {}", e))
                })?;

            if !confirmed {
                return Ok("Clear cancelled".to_string());
            }
        }
        let removed = self.catalog.clear().await?;
        Ok(format!("Removed {} entries", removed))
    }

    fn status_report(&self) -> StatusReport {
        StatusReport {
            store_path: self.store_path.clone(),
            backend: self.catalog.backend_name().to_string(),
            degraded: self.catalog.is_degraded(),
            usage: self.catalog.summary(),
            enrichment_enabled: self.config.enrichment.enabled,
            enrichment_configured: self.enricher.is_configured(),
            enrichment_scope: match self.config.enrichment.scope {
                EnrichmentScope::All => "all".to_string(),
                EnrichmentScope::Latest => "latest".to_string(),
            },
            preserve_folders: self.config.ingest.preserve_folders,
        }
    }

    /// Full id, or a unique prefix of one as shown by `list`.
    fn resolve_id(&self, raw: &str) -> Result<NodeId, ApiError> {
        if let Ok(id) = raw.parse::<NodeId>() {
            return Ok(id);
        }
        let matches = self.catalog.find_by_prefix(raw);
        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(ApiError::InvalidNodeId(format!(
                "'{}' is not an id and matches no entry",
                raw
            ))),
            _ => Err(ApiError::InvalidNodeId(format!(
                "'{}' matches {} entries; use more characters",
                raw,
                matches.len()
            ))),
        }
    }
}

async fn open_store(path: &Path) -> Result<SledNodeStore, StorageError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || SledNodeStore::new(path))
        .await
        .map_err(|e| StorageError::StorageUnavailable(format!("Store open did not complete: {}", e)))?
}

fn parse_sort_key(raw: &str) -> Result<SortKey, ApiError> {
    match raw {
        "name" => Ok(SortKey::Name),
        "size" => Ok(SortKey::Size),
        "created" => Ok(SortKey::Created),
        "kind" => Ok(SortKey::Kind),
        other => Err(ApiError::ConfigError(format!("Unknown sort key: {}", other))),
    }
}

fn parse_kind(raw: &str) -> Result<NodeKind, ApiError> {
    match raw {
        "file" => Ok(NodeKind::File),
        "folder" => Ok(NodeKind::Folder),
        other => Err(ApiError::ConfigError(format!("Unknown kind: {}", other))),
    }
}
