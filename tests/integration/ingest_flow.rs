//! Integration tests for walking a real folder tree into the catalog

use super::test_utils::write_tree;
use cloudflow::catalog::Catalog;
use cloudflow::ingest::{IngestService, Walker, WalkerConfig};
use cloudflow::store::SledNodeStore;
use cloudflow::types::NodeKind;
use std::sync::Arc;
use tempfile::TempDir;

fn sample_drop(root: &std::path::Path) -> std::path::PathBuf {
    let drop = root.join("trip");
    write_tree(
        &drop,
        &[
            ("itinerary.txt", b"day one: museum"),
            ("photos/a.jpg", &[0xFF, 0xD8, 0xFF]),
            ("photos/b.jpg", &[0xFF, 0xD8, 0xFF, 0xE0]),
            ("photos/raw/c.png", &[0x89, 0x50]),
            (".DS_Store", b"junk"),
        ],
    );
    drop
}

async fn sled_catalog(dir: &TempDir) -> Arc<Catalog> {
    let store = SledNodeStore::new(dir.path().join("store")).unwrap();
    Arc::new(Catalog::open(Arc::new(store), None).await.unwrap())
}

#[tokio::test]
async fn test_dropped_tree_is_flattened() {
    let dir = TempDir::new().unwrap();
    let drop = sample_drop(dir.path());
    let walker = Walker::new(WalkerConfig {
        ignore_patterns: vec![".DS_Store".to_string()],
        ..WalkerConfig::default()
    });
    let report = walker.walk_paths(&[drop]).await;
    assert_eq!(report.files.len(), 4);
    assert_eq!(report.total_bytes(), 15 + 3 + 4 + 2);

    let catalog = sled_catalog(&dir).await;
    let outcome = IngestService::new(Arc::clone(&catalog)).ingest(report).await;
    assert!(outcome.is_clean());
    assert_eq!(outcome.files_created(), 4);

    let nodes = catalog.nodes();
    assert_eq!(nodes.len(), 4);
    assert!(nodes.iter().all(|n| n.kind == NodeKind::File && n.parent_id.is_none()));
    let png = nodes.iter().find(|n| n.name == "c.png").unwrap();
    assert_eq!(png.mime_type.as_deref(), Some("image/png"));
}

#[tokio::test]
async fn test_preserved_folders_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let drop = sample_drop(dir.path());
    {
        let walker = Walker::new(WalkerConfig::default());
        let report = walker.walk_paths(&[drop]).await;
        let catalog = sled_catalog(&dir).await;
        let outcome = IngestService::new(Arc::clone(&catalog))
            .preserve_folders(true)
            .ingest(report)
            .await;
        // trip, photos, raw + five files
        assert_eq!(outcome.created.len(), 8);
        catalog.flush().await.unwrap();
    }

    let catalog = sled_catalog(&dir).await;
    let nodes = catalog.nodes();
    let by_name = |name: &str| nodes.iter().find(|n| n.name == name).unwrap().clone();
    let trip = by_name("trip");
    let photos = by_name("photos");
    let raw = by_name("raw");
    assert_eq!(trip.parent_id, None);
    assert_eq!(photos.parent_id, Some(trip.id));
    assert_eq!(raw.parent_id, Some(photos.id));
    assert_eq!(by_name("c.png").parent_id, Some(raw.id));
    assert_eq!(by_name("itinerary.txt").parent_id, Some(trip.id));

    // Folder removal takes the subtree.
    assert_eq!(catalog.remove(&photos.id).await.unwrap(), 5);
    assert_eq!(catalog.summary().folder_count, 1);
}

#[tokio::test]
async fn test_selection_does_not_walk_folders() {
    let dir = TempDir::new().unwrap();
    let drop = sample_drop(dir.path());
    let walker = Walker::new(WalkerConfig::default());

    let report = walker
        .walk_selection(&[drop.join("itinerary.txt"), drop.join("photos")])
        .await;
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].name, "itinerary.txt");
    assert_eq!(report.warnings.len(), 1);
}

#[tokio::test]
async fn test_same_named_drops_stay_separate() {
    let dir = TempDir::new().unwrap();
    let x = dir.path().join("x").join("photos");
    let y = dir.path().join("y").join("photos");
    write_tree(&x, &[("beach.jpg", &[0xFF, 0xD8])]);
    write_tree(&y, &[("city.jpg", &[0xFF, 0xD8, 0xFF])]);

    let report = Walker::new(WalkerConfig::default())
        .walk_paths(&[x, y])
        .await;
    let catalog = sled_catalog(&dir).await;
    let outcome = IngestService::new(Arc::clone(&catalog))
        .preserve_folders(true)
        .ingest(report)
        .await;
    assert!(outcome.is_clean());

    let nodes = catalog.nodes();
    let folders: Vec<_> = nodes.iter().filter(|n| n.kind == NodeKind::Folder).collect();
    assert_eq!(folders.len(), 2);
    let parent_of = |name: &str| nodes.iter().find(|n| n.name == name).unwrap().parent_id;
    let beach = parent_of("beach.jpg").unwrap();
    let city = parent_of("city.jpg").unwrap();
    assert_ne!(beach, city);
    assert!(folders.iter().any(|f| f.id == beach));
    assert!(folders.iter().any(|f| f.id == city));
}

#[tokio::test]
async fn test_file_limit_skips_large_files() {
    let dir = TempDir::new().unwrap();
    let drop = sample_drop(dir.path());
    let walker = Walker::new(WalkerConfig {
        ignore_patterns: vec![".DS_Store".to_string()],
        max_file_bytes: Some(3),
        ..WalkerConfig::default()
    });

    let report = walker.walk_paths(&[drop]).await;
    let mut names: Vec<_> = report.files.iter().map(|f| f.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["a.jpg", "c.png"]);
    assert_eq!(report.warnings.len(), 2);
}
