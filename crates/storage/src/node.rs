//! The bounded key/value store backing one physical node.

use corelib::node::{NodeId, NodeStatus};
use crossbeam::atomic::AtomicCell;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;

/// Bounded key/value storage for one physical node.
///
/// Capacity is an entry count, enforced only for new keys: overwriting an
/// existing key always succeeds. The store carries its own lock so distinct
/// nodes never contend with each other.
///
/// Availability is a flag, not a lifecycle: marking a node down retains every
/// stored entry, so recovery is a status flip with no data loss.
pub struct CacheNode<V> {
    id: NodeId,
    capacity: usize,
    vnodes: usize,
    status: AtomicCell<NodeStatus>,
    entries: RwLock<HashMap<String, V>>,
}

impl<V: Clone> CacheNode<V> {
    /// Create an empty node, initially `Up`.
    pub fn new(id: impl Into<NodeId>, capacity: usize, vnodes: usize) -> Self {
        Self {
            id: id.into(),
            capacity,
            vnodes,
            status: AtomicCell::new(NodeStatus::Up),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Number of ring positions this node projects.
    pub fn vnode_count(&self) -> usize {
        self.vnodes
    }

    /// Store a value.
    ///
    /// Returns false when the node is full and `key` is not already present;
    /// the caller may still have succeeded on other replicas.
    pub fn put(&self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        let mut entries = self.entries.write();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            trace!(node = %self.id, key = %key, "put rejected, node at capacity");
            return false;
        }
        entries.insert(key, value);
        true
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.read().get(key).cloned()
    }

    /// Remove a key. Returns true if it was present.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Maximum entry count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries that can still be stored before `put` starts rejecting.
    pub fn available_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// Fill ratio in `[0, 1]`.
    pub fn load_factor(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        self.len() as f64 / self.capacity as f64
    }

    pub fn status(&self) -> NodeStatus {
        self.status.load()
    }

    pub fn is_up(&self) -> bool {
        self.status.load().is_up()
    }

    /// Take the node out of replica selection. Stored data is retained.
    pub fn mark_down(&self) {
        self.status.store(NodeStatus::Down);
    }

    /// Return the node to replica selection.
    pub fn mark_up(&self) {
        self.status.store(NodeStatus::Up);
    }

    /// Snapshot of all entries, for migration.
    pub fn entries(&self) -> Vec<(String, V)> {
        self.entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Keys only, for migration planning.
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}
