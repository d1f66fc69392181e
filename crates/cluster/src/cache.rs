//! The top-level distributed cache.

use crate::error::ClusterError;
use crate::migration::plan_rebalance;
use crate::stats::{ClusterStats, Counters, NodeLoad};
use corelib::node::{Node, NodeId, NodeStatus};
use corelib::ring::{HashRing, Ring};
use dashmap::DashMap;
use replication::{ReplicationStrategy, SimpleStrategy};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use storage::CacheNode;
use tracing::{debug, info};

/// A key/value cache sharded across a dynamic set of nodes.
///
/// Keys are placed by the consistent-hash ring; each value is written to the
/// replica set chosen by the [`ReplicationStrategy`]. Membership changes move
/// only the keys whose replica sets actually change. Node failure is a status
/// flip masked by the surviving replicas; stored data stays in place until an
/// explicit removal migrates it out.
///
/// All operations take `&self`: the ring, each node's storage, and the
/// counters carry their own synchronization, so the cache can be shared
/// across threads behind an `Arc`.
pub struct DistributedCache<V> {
    ring: Ring,
    nodes: DashMap<NodeId, Arc<CacheNode<V>>>,
    strategy: Box<dyn ReplicationStrategy>,
    counters: Counters,
}

impl<V: Clone + Send + Sync + 'static> DistributedCache<V> {
    /// Create a cache replicating each key to `replication_factor` nodes.
    ///
    /// A factor of 0 is clamped to 1 (a key must live somewhere).
    pub fn new(replication_factor: usize) -> Self {
        Self::with_strategy(Box::new(SimpleStrategy::new(replication_factor.max(1))))
    }

    /// Create a cache with an explicit placement strategy.
    pub fn with_strategy(strategy: Box<dyn ReplicationStrategy>) -> Self {
        Self {
            ring: HashRing::new(),
            nodes: DashMap::new(),
            strategy,
            counters: Counters::new(),
        }
    }

    /// Number of physical nodes in the cluster, regardless of status.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn replication_factor(&self) -> usize {
        self.strategy.replication_factor()
    }

    /// Add a node and rebalance the minimal set of keys onto it.
    ///
    /// The new topology is simulated on a fork of the ring first; only the
    /// keys whose replica set gains the new node are copied, and only then is
    /// the node committed to the ring. Capacity rejections during the copy
    /// skip that key without failing the join.
    pub fn add_node(
        &self,
        id: &str,
        capacity: usize,
        vnodes: usize,
    ) -> Result<(), ClusterError> {
        let node_id = NodeId::new(id);
        if self.nodes.contains_key(&node_id) {
            return Err(ClusterError::DuplicateNode(id.to_string()));
        }
        if capacity == 0 {
            return Err(ClusterError::InvalidConfig(format!(
                "capacity must be positive for node {}",
                id
            )));
        }
        if vnodes == 0 {
            return Err(ClusterError::InvalidConfig(format!(
                "virtual node count must be positive for node {}",
                id
            )));
        }

        let node = Arc::new(CacheNode::new(node_id.clone(), capacity, vnodes));

        // Phase one: plan against a fork carrying the prospective member.
        let trial = self.ring.fork();
        trial.add_node(Node::new(node_id.clone(), node.vnode_count()));
        let held = self.held_keys();
        let plan = plan_rebalance(&self.ring, &trial, self.replication_factor(), &held);
        debug!(node = %node_id, planned = plan.len(), "planned join rebalance");

        let mut copied = 0u64;
        for mv in plan {
            let Some(value) = self.nodes.get(&mv.from).and_then(|n| n.get(&mv.key)) else {
                continue;
            };
            let accepted = if mv.to == node_id {
                node.put(mv.key, value)
            } else {
                match self.nodes.get(&mv.to) {
                    Some(dest) => dest.put(mv.key, value),
                    None => false,
                }
            };
            if accepted {
                copied += 1;
            }
        }
        self.counters.add_migrations(copied);

        // Phase two: commit the member.
        self.ring.add_node(Node::new(node_id.clone(), node.vnode_count()));
        self.nodes.insert(node_id.clone(), node);
        info!(node = %node_id, capacity, vnodes, copied, "node joined");
        Ok(())
    }

    /// Remove a node, migrating every key it held onto the remaining ring.
    ///
    /// Each departed key lands on the first node of its new replica set that
    /// accepts it. Returns false for an unknown id.
    pub fn remove_node(&self, id: &str) -> bool {
        let node_id = NodeId::new(id);
        let Some((_, departing)) = self.nodes.remove(&node_id) else {
            return false;
        };
        self.ring.remove_node(&node_id);

        let rf = self.replication_factor();
        let mut moved = 0u64;
        for (key, value) in departing.entries() {
            for candidate in self.ring.preference_list(key.as_bytes(), rf) {
                let Some(dest) = self.nodes.get(&candidate) else {
                    continue;
                };
                if dest.put(key.clone(), value.clone()) {
                    moved += 1;
                    break;
                }
            }
        }
        self.counters.add_migrations(moved);
        info!(node = %node_id, moved, "node left");
        true
    }

    /// Store a value on every node of the key's replica set.
    ///
    /// True if at least one replica accepted the write. The put counter
    /// tracks attempts, so it advances even when every replica rejects.
    pub fn put(&self, key: &str, value: V) -> bool {
        self.counters.record_put();
        let replicas = self.strategy.replicas_for_key(&self.ring, key.as_bytes());
        let mut stored = false;
        for id in &replicas {
            if let Some(node) = self.nodes.get(id) {
                if node.put(key, value.clone()) {
                    stored = true;
                }
            }
        }
        stored
    }

    /// Fetch a value from the first replica that has it.
    ///
    /// Replicas are consulted in placement order, so a downed primary is
    /// masked by its successors. No read repair is performed.
    pub fn get(&self, key: &str) -> Option<V> {
        let replicas = self.strategy.replicas_for_key(&self.ring, key.as_bytes());
        for id in &replicas {
            if let Some(node) = self.nodes.get(id) {
                if let Some(value) = node.get(key) {
                    self.counters.record_hit();
                    return Some(value);
                }
            }
        }
        self.counters.record_miss();
        None
    }

    /// Delete a key from every replica. True if any replica held it.
    pub fn delete(&self, key: &str) -> bool {
        let replicas = self.strategy.replicas_for_key(&self.ring, key.as_bytes());
        let mut removed = false;
        for id in &replicas {
            if let Some(node) = self.nodes.get(id) {
                if node.remove(key) {
                    removed = true;
                }
            }
        }
        removed
    }

    /// Take a node out of replica selection without touching its data or its
    /// ring entries. Returns false for an unknown id.
    pub fn simulate_node_failure(&self, id: &str) -> bool {
        let node_id = NodeId::new(id);
        let Some(node) = self.nodes.get(&node_id) else {
            return false;
        };
        node.mark_down();
        self.ring.set_status(&node_id, NodeStatus::Down);
        info!(node = %node_id, "simulated node failure");
        true
    }

    /// Return a previously failed node to replica selection. Its retained
    /// data becomes readable again immediately. Returns false for an unknown
    /// id.
    pub fn recover_node(&self, id: &str) -> bool {
        let node_id = NodeId::new(id);
        let Some(node) = self.nodes.get(&node_id) else {
            return false;
        };
        node.mark_up();
        self.ring.set_status(&node_id, NodeStatus::Up);
        info!(node = %node_id, "node recovered");
        true
    }

    /// Per-node load snapshot keyed by node id. No side effects.
    pub fn load_distribution(&self) -> BTreeMap<String, NodeLoad> {
        self.nodes
            .iter()
            .map(|entry| {
                let node = entry.value();
                (
                    entry.key().to_string(),
                    NodeLoad {
                        size: node.len(),
                        capacity: node.capacity(),
                        load_factor: node.load_factor(),
                        status: node.status(),
                    },
                )
            })
            .collect()
    }

    /// Aggregate snapshot over all physical nodes plus the running counters.
    pub fn statistics(&self) -> ClusterStats {
        let mut total_capacity = 0usize;
        let mut total_size = 0usize;
        for entry in self.nodes.iter() {
            total_capacity += entry.value().capacity();
            total_size += entry.value().len();
        }
        ClusterStats {
            nodes: self.nodes.len(),
            total_capacity,
            total_size,
            utilization: if total_capacity == 0 {
                0.0
            } else {
                total_size as f64 / total_capacity as f64
            },
            hit_rate: self.counters.hit_rate(),
            puts: self.counters.puts(),
            migrations: self.counters.migrations(),
            replication_factor: self.replication_factor(),
        }
    }

    /// Every stored key paired with one live node holding its value.
    ///
    /// Input to migration planning; keys replicated on several nodes appear
    /// once.
    fn held_keys(&self) -> Vec<(String, NodeId)> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut held = Vec::new();
        for entry in self.nodes.iter() {
            if !entry.value().is_up() {
                continue;
            }
            for key in entry.value().keys() {
                if seen.insert(key.clone()) {
                    held.push((key, entry.key().clone()));
                }
            }
        }
        held
    }
}
