//! Integration tests for exporting stored files back to disk

use cloudflow::catalog::Catalog;
use cloudflow::export::Exporter;
use cloudflow::store::MemoryNodeStore;
use cloudflow::types::{FileNode, Payload};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_export_round_trip_with_name_collision() {
    let out = TempDir::new().unwrap();
    let catalog = Catalog::open(Arc::new(MemoryNodeStore::new()), None)
        .await
        .unwrap();
    let node = catalog
        .insert(FileNode::file(
            "report.pdf",
            Some("application/pdf".to_string()),
            Payload::new(b"%PDF-1.7".to_vec()),
            None,
        ))
        .await
        .unwrap();

    let exporter = Exporter::new();
    let first = exporter.issue(&node).unwrap().save_to(out.path()).await.unwrap();
    let second = exporter.issue(&node).unwrap().save_to(out.path()).await.unwrap();

    assert_eq!(first, out.path().join("report.pdf"));
    assert_eq!(second, out.path().join("report (1).pdf"));
    assert_eq!(std::fs::read(&second).unwrap(), b"%PDF-1.7");
    assert_eq!(exporter.outstanding(), 0);
}

#[tokio::test]
async fn test_revoked_ticket_writes_nothing() {
    let out = TempDir::new().unwrap();
    let node = FileNode::file("a.txt", None, Payload::from(&b"a"[..]), None);
    let exporter = Exporter::new();

    let ticket = exporter.issue(&node).unwrap();
    assert_eq!(exporter.outstanding(), 1);
    ticket.revoke();

    assert_eq!(exporter.outstanding(), 0);
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}
