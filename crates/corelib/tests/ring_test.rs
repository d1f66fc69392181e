//! Comprehensive tests for the hash ring implementation.
//!
//! # Test Strategy
//!
//! 1. **Basic functionality**: Empty ring, add/lookup, remove
//! 2. **Multiple nodes**: Distribution, consistency
//! 3. **Replica enumeration**: Distinctness, liveness filtering
//! 4. **Edge cases**: Wraparound, single node, re-add
//! 5. **Properties**: Remapping stability when membership changes

use corelib::node::{Node, NodeId, NodeStatus};
use corelib::ring::{HashRing, RingBuilder};
use proptest::prelude::*;

// ============================================================================
// Basic Functionality Tests
// ============================================================================

#[test]
fn test_empty_ring_lookup() {
    // An empty ring answers every question with "nothing", never a panic
    let ring: HashRing = HashRing::new();
    assert_eq!(ring.lookup(b"key1"), None);
    assert!(ring.lookup_node(b"key1").is_none());
    assert!(ring.preference_list(b"key1", 3).is_empty());
    assert_eq!(ring.node_count(), 0);
    assert_eq!(ring.token_count(), 0);
    assert!(ring.is_empty());
}

#[test]
fn test_add_node_and_lookup() {
    let ring: HashRing = HashRing::new();
    ring.add_node(Node::new("n1", 4));

    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.token_count(), 4); // 4 vnodes

    let result = ring.lookup(b"test-key");
    assert_eq!(result, Some(NodeId::new("n1")), "Should return the added node");

    let node_meta = ring.lookup_node(b"test-key");
    assert!(node_meta.is_some(), "Should return node metadata");
    assert_eq!(node_meta.map(|n| n.id), Some(NodeId::new("n1")));

    let retrieved = ring.get_node(&NodeId::new("n1"));
    assert!(retrieved.is_some(), "Should retrieve node by ID");
}

#[test]
fn test_remove_node() {
    let ring: HashRing = HashRing::new();

    ring.add_node(Node::new("n1", 4));
    ring.add_node(Node::new("n2", 4));

    assert_eq!(ring.node_count(), 2);
    assert_eq!(ring.token_count(), 8); // 4 + 4 vnodes

    let removed = ring.remove_node(&NodeId::new("n1"));
    assert!(removed.is_some(), "Should return the removed node record");
    assert_eq!(removed.map(|n| n.vnodes), Some(4));

    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.token_count(), 4); // Only n2's vnodes remain

    // Lookups now only resolve to n2
    assert_eq!(ring.lookup(b"some-key"), Some(NodeId::new("n2")));
    assert!(ring.get_node(&NodeId::new("n1")).is_none(), "n1 should be gone");
    assert!(ring.get_node(&NodeId::new("n2")).is_some(), "n2 should remain");

    // Removing a non-existent node yields None
    assert!(ring.remove_node(&NodeId::new("n999")).is_none());
}

// ============================================================================
// Multiple Nodes Tests
// ============================================================================

#[test]
fn test_multiple_nodes() {
    let ring: HashRing = HashRing::new();

    ring.add_node(Node::new("n1", 4));
    ring.add_node(Node::new("n2", 4));
    ring.add_node(Node::new("n3", 4));

    assert_eq!(ring.node_count(), 3);
    assert_eq!(ring.token_count(), 12); // 3 nodes * 4 vnodes

    let valid: Vec<NodeId> = vec![NodeId::new("n1"), NodeId::new("n2"), NodeId::new("n3")];
    for key in [b"key1".as_ref(), b"key2".as_ref(), b"key3".as_ref()] {
        let owner = ring.lookup(key);
        assert!(owner.is_some(), "All lookups should succeed");
        assert!(
            owner.map_or(false, |id| valid.contains(&id)),
            "Owner must be one of the added nodes"
        );
    }
}

#[test]
fn test_consistent_lookup() {
    // The same key always maps to the same node
    let ring: HashRing = HashRing::new();

    ring.add_node(Node::new("n1", 4));
    ring.add_node(Node::new("n2", 4));

    let key = b"consistent-key";
    let first = ring.lookup(key);
    for _ in 0..10 {
        assert_eq!(ring.lookup(key), first, "Same key should map to same node");
    }
    assert_eq!(ring.partition(key), ring.partition(key), "Placement has no hidden randomness");
}

#[test]
fn test_tokens_sorted_ascending() {
    let ring: HashRing = HashRing::new();
    ring.add_node(Node::new("n1", 64));
    ring.add_node(Node::new("n2", 64));

    let tokens = ring.tokens();
    assert_eq!(tokens.len(), 128);
    for pair in tokens.windows(2) {
        assert!(pair[0].0 < pair[1].0, "Ring entries must be strictly ascending");
    }
}

// ============================================================================
// Replica Enumeration Tests
// ============================================================================

#[test]
fn test_preference_list_distinct_nodes() {
    let ring: HashRing = HashRing::new();
    ring.add_node(Node::new("n1", 32));
    ring.add_node(Node::new("n2", 32));
    ring.add_node(Node::new("n3", 32));

    let list = ring.preference_list(b"user:42", 3);
    assert_eq!(list.len(), 3);
    let unique: std::collections::HashSet<_> = list.iter().collect();
    assert_eq!(unique.len(), 3, "Replicas must be distinct physical nodes");
}

#[test]
fn test_preference_list_primary_first() {
    let ring: HashRing = HashRing::new();
    ring.add_node(Node::new("n1", 32));
    ring.add_node(Node::new("n2", 32));
    ring.add_node(Node::new("n3", 32));

    let primary = ring.lookup(b"user:42");
    let list = ring.preference_list(b"user:42", 2);
    assert_eq!(list.first().cloned(), primary, "List starts at the primary owner");
}

#[test]
fn test_preference_list_capped_by_cluster_size() {
    let ring: HashRing = HashRing::new();
    ring.add_node(Node::new("n1", 8));
    ring.add_node(Node::new("n2", 8));

    // Asking for more replicas than nodes yields every node once
    let list = ring.preference_list(b"k", 5);
    assert_eq!(list.len(), 2);
}

#[test]
fn test_preference_list_skips_down_nodes() {
    let ring: HashRing = HashRing::new();
    ring.add_node(Node::new("n1", 32));
    ring.add_node(Node::new("n2", 32));
    ring.add_node(Node::new("n3", 32));

    let before = ring.preference_list(b"user:42", 3);
    assert_eq!(before.len(), 3);

    let downed = before[0].clone();
    assert!(ring.set_status(&downed, NodeStatus::Down));

    let after = ring.preference_list(b"user:42", 3);
    assert_eq!(after.len(), 2, "Down node is excluded");
    assert!(!after.contains(&downed));

    // Entries are untouched, so recovery restores the original routing
    assert!(ring.set_status(&downed, NodeStatus::Up));
    assert_eq!(ring.preference_list(b"user:42", 3), before);
}

#[test]
fn test_set_status_unknown_node() {
    let ring: HashRing = HashRing::new();
    assert!(!ring.set_status(&NodeId::new("ghost"), NodeStatus::Down));
}

// ============================================================================
// Ring Builder Tests
// ============================================================================

#[test]
fn test_ring_builder_default() {
    let ring = RingBuilder::new()
        .add_node("n1")
        .add_node("n2")
        .build();

    assert!(ring.lookup(b"key").is_some(), "Lookup should work");
    assert_eq!(ring.node_count(), 2, "Should have 2 nodes");
    // Default is 128 vnodes per node
    assert_eq!(ring.token_count(), 256, "Should have 256 tokens (2 * 128)");
}

#[test]
fn test_ring_builder_custom_vnodes() {
    let ring = RingBuilder::new()
        .with_vnodes(8)
        .add_node("n1")
        .add_node("n2")
        .build();

    assert!(ring.lookup(b"key").is_some());
    assert_eq!(ring.node_count(), 2);
    assert_eq!(ring.token_count(), 16); // 2 nodes * 8 vnodes
}

#[test]
fn test_ring_builder_mixed_vnodes() {
    let ring = RingBuilder::new()
        .with_vnodes(4)
        .add_node("n1") // Uses default (4)
        .add_node_with_vnodes("n2", 8) // Custom (8)
        .build();

    assert_eq!(ring.node_count(), 2);
    assert_eq!(ring.token_count(), 12); // 4 + 8
}

// ============================================================================
// Edge Cases
// ============================================================================

#[test]
fn test_single_node() {
    let ring: HashRing = HashRing::new();
    ring.add_node(Node::new("n1", 4));

    // All keys map to the single node
    for key in [b"key1".as_ref(), b"key2".as_ref(), b"very-long-key-name".as_ref()] {
        assert_eq!(ring.lookup(key), Some(NodeId::new("n1")));
    }
}

#[test]
fn test_add_remove_add() {
    let ring: HashRing = HashRing::new();

    ring.add_node(Node::new("n1", 4));
    assert_eq!(ring.node_count(), 1);

    assert!(ring.remove_node(&NodeId::new("n1")).is_some());
    assert_eq!(ring.node_count(), 0);

    ring.add_node(Node::new("n1", 4));
    assert_eq!(ring.node_count(), 1);
    assert!(ring.lookup(b"key").is_some());
}

#[test]
fn test_readd_replaces_entries() {
    let ring: HashRing = HashRing::new();

    ring.add_node(Node::new("n1", 4));
    assert_eq!(ring.token_count(), 4);

    // Re-adding the same id replaces its entries rather than accumulating
    ring.add_node(Node::new("n1", 8));
    assert_eq!(ring.token_count(), 8);
    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.get_node(&NodeId::new("n1")).map(|n| n.vnodes), Some(8));
}

#[test]
fn test_fork_is_independent() {
    let ring: HashRing = HashRing::new();
    ring.add_node(Node::new("n1", 4));

    let fork = ring.fork();
    fork.add_node(Node::new("n2", 4));

    assert_eq!(ring.node_count(), 1, "Original is unaffected by the fork");
    assert_eq!(fork.node_count(), 2);
    assert_eq!(fork.token_count(), 8);
}

#[test]
fn test_get_all_nodes() {
    let ring: HashRing = HashRing::new();

    ring.add_node(Node::new("n1", 4));
    ring.add_node(Node::new("n2", 4));

    let nodes = ring.nodes();
    assert_eq!(nodes.len(), 2);

    let node_ids: Vec<NodeId> = nodes.iter().map(|n| n.id.clone()).collect();
    assert!(node_ids.contains(&NodeId::new("n1")));
    assert!(node_ids.contains(&NodeId::new("n2")));
}

#[test]
fn test_partitioner_name() {
    let ring: HashRing = HashRing::new();
    assert_eq!(ring.partitioner_name(), "Xxh3Partitioner");
}

#[test]
fn test_alternate_partitioner() {
    use corelib::partitioner::SipPartitioner;

    let ring: HashRing<SipPartitioner> = HashRing::new();
    ring.add_node(Node::new("n1", 8));
    assert_eq!(ring.partitioner_name(), "SipPartitioner");
    assert_eq!(ring.lookup(b"key"), Some(NodeId::new("n1")));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Adding a node may only remap a key to the new node; every other key
    /// keeps its previous owner. This is the consistent-hashing contract
    /// that bounds data movement on membership change.
    #[test]
    fn prop_remap_only_to_new_node(keys in prop::collection::vec("[a-z0-9:]{1,24}", 1..80)) {
        let ring: HashRing = HashRing::new();
        ring.add_node(Node::new("n1", 64));
        ring.add_node(Node::new("n2", 64));
        ring.add_node(Node::new("n3", 64));

        let before: Vec<_> = keys.iter().map(|k| ring.lookup(k.as_bytes())).collect();

        ring.add_node(Node::new("n4", 64));

        for (key, old_owner) in keys.iter().zip(before) {
            let new_owner = ring.lookup(key.as_bytes());
            prop_assert!(
                new_owner == old_owner || new_owner == Some(NodeId::new("n4")),
                "key {} moved to {:?}, expected {:?} or the new node",
                key, new_owner, old_owner
            );
        }
    }
}
