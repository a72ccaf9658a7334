//! Property-based tests for listing order and size formatting

use cloudflow::types::{FileNode, NodeKind, Payload};
use cloudflow::views::{format_bytes, listing, ListingPolicy, SortKey, SortOrder};
use proptest::prelude::*;

fn nodes_strategy() -> impl Strategy<Value = Vec<FileNode>> {
    prop::collection::vec(("[a-zA-Z]{1,6}", 0usize..64, any::<bool>()), 0..24).prop_map(
        |specs| {
            specs
                .into_iter()
                .map(|(name, size, is_folder)| {
                    if is_folder {
                        FileNode::folder(name, None)
                    } else {
                        FileNode::file(name, None, Payload::new(vec![0; size]), None)
                    }
                })
                .collect()
        },
    )
}

fn sort_key_strategy() -> impl Strategy<Value = SortKey> {
    prop_oneof![
        Just(SortKey::Name),
        Just(SortKey::Size),
        Just(SortKey::Created),
        Just(SortKey::Kind),
    ]
}

proptest! {
    /// The same set of nodes lists identically whatever order it arrives in
    #[test]
    fn test_listing_independent_of_input_order(
        nodes in nodes_strategy(),
        key in sort_key_strategy(),
        desc in any::<bool>(),
    ) {
        let order = if desc { SortOrder::Desc } else { SortOrder::Asc };
        let policy = ListingPolicy::sorted_by(key, order);
        let mut reversed = nodes.clone();
        reversed.reverse();

        let a: Vec<_> = listing(nodes, &policy).into_iter().map(|n| n.id).collect();
        let b: Vec<_> = listing(reversed, &policy).into_iter().map(|n| n.id).collect();
        prop_assert_eq!(a, b);
    }

    /// Size order is monotone and filtering keeps exactly the requested kind
    #[test]
    fn test_size_listing_is_monotone(nodes in nodes_strategy(), limit in 0usize..30) {
        let files_in = nodes.iter().filter(|n| n.kind == NodeKind::File).count();
        let policy = ListingPolicy {
            sort: SortKey::Size,
            order: SortOrder::Asc,
            kind: Some(NodeKind::File),
            limit: Some(limit),
        };
        let out = listing(nodes, &policy);

        prop_assert_eq!(out.len(), files_in.min(limit));
        prop_assert!(out.iter().all(|n| n.kind == NodeKind::File));
        for pair in out.windows(2) {
            prop_assert!(pair[0].size <= pair[1].size);
        }
    }

    /// Formatted sizes carry a known unit and no trailing zero decimals
    #[test]
    fn test_format_bytes_shape(bytes in any::<u64>()) {
        let text = format_bytes(bytes);
        let (number, unit) = text.split_once(' ').unwrap();
        prop_assert!(["B", "KB", "MB", "GB", "TB"].contains(&unit));
        if number.contains('.') {
            prop_assert!(!number.ends_with('0'));
            prop_assert!(number.split('.').nth(1).unwrap().len() <= 2);
        }
        let value: f64 = number.parse().unwrap();
        if unit != "TB" {
            prop_assert!(value <= 1024.0);
        }
    }
}
