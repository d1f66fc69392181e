//! Migration planning for membership changes.
//!
//! A membership change is planned in two phases: simulate the new topology on
//! a [`fork`](corelib::ring::HashRing::fork) of the ring, diff replica
//! placements between the old and new rings, and only then commit the change
//! and copy data. Planning is a pure function over two rings, so it is
//! testable without touching any stored value.

use corelib::node::NodeId;
use corelib::ring::Ring;

/// A single key that must be copied from one node to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMove {
    /// The key whose replica set changed.
    pub key: String,
    /// A node currently holding the value.
    pub from: NodeId,
    /// The node that should hold it after the change.
    pub to: NodeId,
}

/// Diff replica placements between two ring topologies.
///
/// `held` lists every stored key with one live node currently holding its
/// value. For each key, every node in the new replica set that is neither in
/// the old set nor the holder itself produces one [`KeyMove`].
///
/// Adding a node to the ring can only pull keys toward the joining node, so
/// the resulting plan moves on the order of `total_keys / node_count` keys.
pub fn plan_rebalance(
    old: &Ring,
    new: &Ring,
    replication_factor: usize,
    held: &[(String, NodeId)],
) -> Vec<KeyMove> {
    let mut plan = Vec::new();
    for (key, holder) in held {
        let old_set = old.preference_list(key.as_bytes(), replication_factor);
        let new_set = new.preference_list(key.as_bytes(), replication_factor);
        for target in new_set {
            if target != *holder && !old_set.contains(&target) {
                plan.push(KeyMove {
                    key: key.clone(),
                    from: holder.clone(),
                    to: target,
                });
            }
        }
    }
    plan
}
