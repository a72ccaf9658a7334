//! Integration tests for ingest followed by background descriptions

use async_trait::async_trait;
use cloudflow::catalog::Catalog;
use cloudflow::enrich::{DescriptionService, EnrichmentScope, Enricher};
use cloudflow::error::EnrichmentError;
use cloudflow::ingest::{DropEntry, IngestService, Walker, WalkerConfig};
use cloudflow::store::MemoryNodeStore;
use std::sync::Arc;
use tempfile::TempDir;

/// Describes by echoing the metadata; fails for names containing "fail".
struct EchoDescriber;

#[async_trait]
impl DescriptionService for EchoDescriber {
    async fn describe(
        &self,
        name: &str,
        mime_type: &str,
        size_bytes: u64,
    ) -> Result<String, EnrichmentError> {
        if name.contains("fail") {
            return Err(EnrichmentError::RequestFailed("upstream 500".to_string()));
        }
        Ok(format!("{} is {} of {} bytes.", name, mime_type, size_bytes))
    }
}

async fn setup(scope: EnrichmentScope) -> (TempDir, Arc<Catalog>, Arc<Enricher>) {
    let dir = TempDir::new().unwrap();
    let catalog = Arc::new(
        Catalog::open(Arc::new(MemoryNodeStore::new()), None)
            .await
            .unwrap(),
    );
    let enricher = Arc::new(Enricher::new(
        Arc::clone(&catalog),
        Arc::new(EchoDescriber),
        scope,
    ));
    (dir, catalog, enricher)
}

#[tokio::test]
async fn test_every_file_gets_an_insight() {
    let (dir, catalog, enricher) = setup(EnrichmentScope::All).await;
    std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    std::fs::write(dir.path().join("b.csv"), b"x,y").unwrap();

    let report = Walker::new(WalkerConfig::default())
        .walk_drop(vec![
            DropEntry::File(dir.path().join("a.txt")),
            DropEntry::File(dir.path().join("b.csv")),
        ])
        .await;
    let outcome = IngestService::new(Arc::clone(&catalog))
        .with_enricher(Arc::clone(&enricher))
        .ingest(report)
        .await;
    assert_eq!(outcome.enrichment_dispatched, 2);

    let summary = enricher.wait().await;
    assert_eq!(summary.described, 2);
    assert_eq!(enricher.pending(), 0);

    let a = catalog.nodes().into_iter().find(|n| n.name == "a.txt").unwrap();
    assert_eq!(a.insight.as_deref(), Some("a.txt is text/plain of 5 bytes."));
}

#[tokio::test]
async fn test_failed_description_leaves_node_untouched() {
    let (dir, catalog, enricher) = setup(EnrichmentScope::All).await;
    std::fs::write(dir.path().join("ok.txt"), b"1").unwrap();
    std::fs::write(dir.path().join("will-fail.txt"), b"2").unwrap();

    let report = Walker::new(WalkerConfig::default())
        .walk_paths(&[dir.path().join("ok.txt"), dir.path().join("will-fail.txt")])
        .await;
    IngestService::new(Arc::clone(&catalog))
        .with_enricher(Arc::clone(&enricher))
        .ingest(report)
        .await;

    let summary = enricher.wait().await;
    assert_eq!(summary.described, 1);
    assert_eq!(summary.failed, 1);

    let failed = catalog
        .nodes()
        .into_iter()
        .find(|n| n.name == "will-fail.txt")
        .unwrap();
    assert!(failed.insight.is_none());
    assert_eq!(failed.size, Some(1));
    assert_eq!(catalog.len(), 2);
}

#[tokio::test]
async fn test_latest_scope_describes_last_file_only() {
    let (dir, catalog, enricher) = setup(EnrichmentScope::Latest).await;
    std::fs::write(dir.path().join("first.txt"), b"1").unwrap();
    std::fs::write(dir.path().join("second.txt"), b"2").unwrap();

    let report = Walker::new(WalkerConfig::default())
        .walk_paths(&[dir.path().join("first.txt"), dir.path().join("second.txt")])
        .await;
    let outcome = IngestService::new(Arc::clone(&catalog))
        .with_enricher(Arc::clone(&enricher))
        .ingest(report)
        .await;
    assert_eq!(outcome.enrichment_dispatched, 1);
    enricher.wait().await;

    let described: Vec<String> = catalog
        .nodes()
        .into_iter()
        .filter(|n| n.insight.is_some())
        .map(|n| n.name)
        .collect();
    assert_eq!(described, vec!["second.txt".to_string()]);
}
