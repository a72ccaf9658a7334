//! Integration tests for the durable node store and the catalog above it

use cloudflow::catalog::Catalog;
use cloudflow::error::{ApiError, StorageError};
use cloudflow::store::{NodeStore, SledNodeStore};
use cloudflow::types::{FileNode, NodeKind, Payload};
use std::sync::Arc;
use tempfile::TempDir;

async fn open_catalog(dir: &TempDir, quota: Option<u64>) -> Catalog {
    let store = SledNodeStore::new(dir.path().join("store")).unwrap();
    Catalog::open(Arc::new(store), quota).await.unwrap()
}

/// Nodes and payloads survive closing and reopening the store
#[tokio::test]
async fn test_catalog_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let (file_id, folder_id) = {
        let catalog = open_catalog(&dir, None).await;
        let folder = catalog.insert(FileNode::folder("photos", None)).await.unwrap();
        let file = catalog
            .insert(FileNode::file(
                "beach.jpg",
                Some("image/jpeg".to_string()),
                Payload::new(vec![0xFF; 4096]),
                Some(folder.id),
            ))
            .await
            .unwrap();
        catalog.flush().await.unwrap();
        (file.id, folder.id)
    };

    let catalog = open_catalog(&dir, None).await;
    assert_eq!(catalog.len(), 2);
    let file = catalog.get(&file_id).unwrap();
    assert_eq!(file.parent_id, Some(folder_id));
    assert_eq!(file.size, Some(4096));
    assert_eq!(file.payload.unwrap().as_bytes(), &[0xFF; 4096][..]);
    let folder = catalog.get(&folder_id).unwrap();
    assert_eq!(folder.kind, NodeKind::Folder);
    assert!(folder.payload.is_none());
}

/// Insight attached in one session is visible in the next
#[tokio::test]
async fn test_insight_is_durable() {
    let dir = TempDir::new().unwrap();
    let id = {
        let catalog = open_catalog(&dir, None).await;
        let node = catalog
            .insert(FileNode::file("a.txt", None, Payload::from(&b"a"[..]), None))
            .await
            .unwrap();
        catalog.set_insight(&node.id, "A one-letter note.".to_string()).await.unwrap();
        catalog.flush().await.unwrap();
        node.id
    };

    let catalog = open_catalog(&dir, None).await;
    assert_eq!(
        catalog.get(&id).unwrap().insight.as_deref(),
        Some("A one-letter note.")
    );
    let err = catalog.set_insight(&id, "again".to_string()).await.unwrap_err();
    assert!(matches!(err, ApiError::InsightAlreadySet(_)));
}

/// Removing a folder removes its subtree from the store, not only from memory
#[tokio::test]
async fn test_cascade_remove_is_durable() {
    let dir = TempDir::new().unwrap();
    let keep_id = {
        let catalog = open_catalog(&dir, None).await;
        let top = catalog.insert(FileNode::folder("top", None)).await.unwrap();
        let inner = catalog.insert(FileNode::folder("inner", Some(top.id))).await.unwrap();
        catalog
            .insert(FileNode::file("deep.txt", None, Payload::from(&b"x"[..]), Some(inner.id)))
            .await
            .unwrap();
        let keep = catalog
            .insert(FileNode::file("keep.txt", None, Payload::from(&b"k"[..]), None))
            .await
            .unwrap();

        assert_eq!(catalog.remove(&top.id).await.unwrap(), 3);
        catalog.flush().await.unwrap();
        keep.id
    };

    let store = SledNodeStore::new(dir.path().join("store")).unwrap();
    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, keep_id);
}

/// A rejected insert leaves usage and the store unchanged
#[tokio::test]
async fn test_quota_rejection_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir, Some(1000)).await;
    catalog
        .insert(FileNode::file("a.bin", None, Payload::new(vec![0; 600]), None))
        .await
        .unwrap();

    let err = catalog
        .insert(FileNode::file("b.bin", None, Payload::new(vec![0; 600]), None))
        .await
        .unwrap_err();
    match err {
        ApiError::StorageError(StorageError::QuotaExceeded {
            requested,
            used,
            quota,
        }) => {
            assert_eq!(requested, 600);
            assert_eq!(used, 600);
            assert_eq!(quota, 1000);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(catalog.usage(), 600);
    assert_eq!(catalog.len(), 1);
}

/// Clear empties both trees
#[tokio::test]
async fn test_clear_empties_store() {
    let dir = TempDir::new().unwrap();
    {
        let catalog = open_catalog(&dir, None).await;
        for i in 0..5 {
            catalog
                .insert(FileNode::file(format!("f{}.txt", i), None, Payload::new(vec![1; 10]), None))
                .await
                .unwrap();
        }
        assert_eq!(catalog.clear().await.unwrap(), 5);
        catalog.flush().await.unwrap();
    }
    let catalog = open_catalog(&dir, None).await;
    assert!(catalog.is_empty());
    assert_eq!(catalog.usage(), 0);
}
