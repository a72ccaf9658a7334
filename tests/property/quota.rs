//! Property-based tests for quota enforcement

use cloudflow::catalog::Catalog;
use cloudflow::store::MemoryNodeStore;
use cloudflow::types::{FileNode, Payload};
use proptest::prelude::*;
use std::sync::Arc;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Usage never passes the quota, and every accepted file is counted exactly once
    #[test]
    fn test_usage_never_exceeds_quota(
        quota in 1u64..4096,
        sizes in prop::collection::vec(0usize..1024, 1..20),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let (accepted, usage) = runtime.block_on(async {
            let catalog = Catalog::open(Arc::new(MemoryNodeStore::new()), Some(quota))
                .await
                .unwrap();
            let mut accepted = 0u64;
            for (i, size) in sizes.iter().enumerate() {
                let node = FileNode::file(format!("f{}", i), None, Payload::new(vec![0; *size]), None);
                if catalog.insert(node).await.is_ok() {
                    accepted += *size as u64;
                }
            }
            (accepted, catalog.usage())
        });

        prop_assert!(usage <= quota);
        prop_assert_eq!(usage, accepted);
    }
}
