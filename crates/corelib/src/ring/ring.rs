//! Hash ring data structure.
//!
//! The ring is an ascending-sorted vector of virtual nodes plus a map of
//! physical node records. Lookup is a binary search for the first token at or
//! after the key's token, wrapping to the start of the vector past the end.

use crate::node::{Node, NodeId, NodeStatus};
use crate::partitioner::{Partitioner, Xxh3Partitioner};
use crate::token::Token;
use crate::vnode::VirtualNode;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Default virtual nodes per physical node.
///
/// Balances distribution quality against ring size for the small clusters
/// this library targets.
pub const DEFAULT_VNODES: usize = 128;

struct RingState<T: Token> {
    /// Ring entries in ascending token order.
    entries: Vec<VirtualNode<T>>,
    /// Physical node records keyed by id.
    nodes: HashMap<NodeId, Node>,
}

impl<T: Token> RingState<T> {
    fn empty() -> Self {
        Self {
            entries: Vec::new(),
            nodes: HashMap::new(),
        }
    }

    /// Index of the entry owning `token`: first entry at or after it,
    /// wrapping to index 0 past the last entry.
    fn owner_index(&self, token: T) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let idx = self.entries.partition_point(|vn| vn.token < token);
        Some(if idx == self.entries.len() { 0 } else { idx })
    }

    /// Restore the sorted-ascending invariant after appending entries.
    /// Token collisions resolve last-write-wins: the stable sort keeps
    /// insertion order within an equal-token run, and only the run's final
    /// entry survives.
    fn normalize(&mut self) {
        self.entries.sort_by(|a, b| a.token.cmp(&b.token));
        let sorted = std::mem::take(&mut self.entries);
        let mut deduped = Vec::with_capacity(sorted.len());
        let mut pending = sorted.into_iter().peekable();
        while let Some(vn) = pending.next() {
            let superseded = pending.peek().map_or(false, |next| next.token == vn.token);
            if !superseded {
                deduped.push(vn);
            }
        }
        self.entries = deduped;
    }
}

/// Consistent hash ring mapping keys to physical nodes.
///
/// Interior-mutable: a shared ring serves concurrent lookups under a read
/// lock while membership changes take the write lock. The `parking_lot`
/// guards are never held across calls back into user code.
///
/// # Example
///
/// ```rust
/// use corelib::{HashRing, Node};
///
/// let ring: HashRing = HashRing::new();
/// ring.add_node(Node::new("n1", 4));
/// assert!(ring.lookup(b"some-key").is_some());
/// ```
pub struct HashRing<P: Partitioner = Xxh3Partitioner> {
    partitioner: Arc<P>,
    state: RwLock<RingState<P::TokenType>>,
}

impl<P: Partitioner> HashRing<P> {
    /// Create an empty ring with the default-constructed partitioner.
    pub fn new() -> Self {
        Self::with_partitioner(P::default())
    }

    /// Create an empty ring with an explicit partitioner instance.
    pub fn with_partitioner(partitioner: P) -> Self {
        Self {
            partitioner: Arc::new(partitioner),
            state: RwLock::new(RingState::empty()),
        }
    }

    /// Hash a key to its ring position.
    pub fn partition(&self, key: &[u8]) -> P::TokenType {
        self.partitioner.partition(key)
    }

    /// Name of the partitioner placing keys on this ring.
    pub fn partitioner_name(&self) -> &'static str {
        self.partitioner.name()
    }

    /// Add a physical node, projecting `node.vnodes` entries onto the ring.
    ///
    /// Re-adding an existing id replaces its entries (last write wins), so
    /// the per-node entry count always matches the node record.
    pub fn add_node(&self, node: Node) {
        let mut state = self.state.write();
        if state.nodes.contains_key(&node.id) {
            state.entries.retain(|vn| vn.node_id != node.id);
        }
        for index in 0..node.vnodes {
            let vn = VirtualNode::for_index(self.partitioner.as_ref(), &node.id, index);
            state.entries.push(vn);
        }
        state.normalize();
        debug!(node = %node.id, vnodes = node.vnodes, "added node to ring");
        state.nodes.insert(node.id.clone(), node);
    }

    /// Remove a node and all of its ring entries.
    ///
    /// Returns the removed node record so the caller can migrate its data,
    /// or `None` if the id is not on the ring.
    pub fn remove_node(&self, id: &NodeId) -> Option<Node> {
        let mut state = self.state.write();
        let node = state.nodes.remove(id)?;
        state.entries.retain(|vn| vn.node_id != *id);
        debug!(node = %id, "removed node from ring");
        Some(node)
    }

    /// Primary owner for a key, or `None` on an empty ring.
    ///
    /// The primary is positional: a `Down` node still owns its slice. Use
    /// [`preference_list`](Self::preference_list) for liveness-aware routing.
    pub fn lookup(&self, key: &[u8]) -> Option<NodeId> {
        let token = self.partitioner.partition(key);
        let state = self.state.read();
        let idx = state.owner_index(token)?;
        Some(state.entries[idx].node_id.clone())
    }

    /// Primary owner's full node record for a key.
    pub fn lookup_node(&self, key: &[u8]) -> Option<Node> {
        let token = self.partitioner.partition(key);
        let state = self.state.read();
        let idx = state.owner_index(token)?;
        state.nodes.get(&state.entries[idx].node_id).cloned()
    }

    /// Ordered replica candidates for a key.
    ///
    /// Walks the ring clockwise from the key's position, collecting distinct
    /// physical nodes whose status is `Up`, until `count` nodes are found or
    /// every entry has been visited once. The order defines replica roles:
    /// primary first, then successors.
    pub fn preference_list(&self, key: &[u8], count: usize) -> Vec<NodeId> {
        if count == 0 {
            return Vec::new();
        }
        let token = self.partitioner.partition(key);
        let state = self.state.read();
        let Some(start) = state.owner_index(token) else {
            return Vec::new();
        };

        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut list = Vec::with_capacity(count);
        for offset in 0..state.entries.len() {
            let vn = &state.entries[(start + offset) % state.entries.len()];
            if !seen.insert(&vn.node_id) {
                continue;
            }
            let up = state.nodes.get(&vn.node_id).map_or(false, Node::is_up);
            if !up {
                continue;
            }
            list.push(vn.node_id.clone());
            if list.len() == count {
                break;
            }
        }
        list
    }

    /// Flip a node's availability flag without touching its entries.
    ///
    /// Returns false if the id is not on the ring.
    pub fn set_status(&self, id: &NodeId, status: NodeStatus) -> bool {
        let mut state = self.state.write();
        match state.nodes.get_mut(id) {
            Some(node) => {
                node.status = status;
                true
            }
            None => false,
        }
    }

    /// Node record by id.
    pub fn get_node(&self, id: &NodeId) -> Option<Node> {
        self.state.read().nodes.get(id).cloned()
    }

    /// All physical node records.
    pub fn nodes(&self) -> Vec<Node> {
        self.state.read().nodes.values().cloned().collect()
    }

    /// Number of physical nodes.
    pub fn node_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Number of ring entries (virtual nodes).
    pub fn token_count(&self) -> usize {
        self.state.read().entries.len()
    }

    /// All ring entries as `(token, owner)` pairs, in ring order.
    pub fn tokens(&self) -> Vec<(P::TokenType, NodeId)> {
        self.state
            .read()
            .entries
            .iter()
            .map(|vn| (vn.token, vn.node_id.clone()))
            .collect()
    }

    /// True if the ring has no nodes.
    pub fn is_empty(&self) -> bool {
        self.state.read().nodes.is_empty()
    }

    /// Independent copy of this ring's topology.
    ///
    /// Shares the partitioner; mutations on the fork do not affect the
    /// original. This is the primitive under two-phase migration planning:
    /// simulate a membership change on a fork, diff placements, then commit.
    pub fn fork(&self) -> Self {
        let state = self.state.read();
        Self {
            partitioner: Arc::clone(&self.partitioner),
            state: RwLock::new(RingState {
                entries: state.entries.clone(),
                nodes: state.nodes.clone(),
            }),
        }
    }
}

impl<P: Partitioner> Default for HashRing<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> std::fmt::Debug for HashRing<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("HashRing")
            .field("partitioner", &self.partitioner.name())
            .field("nodes", &state.nodes.len())
            .field("tokens", &state.entries.len())
            .finish()
    }
}

/// Builder for rings with uniform or per-node virtual node counts.
///
/// # Example
///
/// ```rust
/// use corelib::ring::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .with_vnodes(8)
///     .add_node("n1")
///     .add_node_with_vnodes("n2", 16)
///     .build();
/// assert_eq!(ring.token_count(), 24);
/// ```
#[derive(Debug)]
pub struct RingBuilder<P: Partitioner = Xxh3Partitioner> {
    partitioner: P,
    default_vnodes: usize,
    nodes: Vec<(NodeId, Option<usize>)>,
}

impl RingBuilder<Xxh3Partitioner> {
    pub fn new() -> Self {
        Self::with_partitioner(Xxh3Partitioner)
    }
}

impl Default for RingBuilder<Xxh3Partitioner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Partitioner> RingBuilder<P> {
    pub fn with_partitioner(partitioner: P) -> Self {
        Self {
            partitioner,
            default_vnodes: DEFAULT_VNODES,
            nodes: Vec::new(),
        }
    }

    /// Set the virtual node count applied to nodes without an explicit one.
    pub fn with_vnodes(mut self, vnodes: usize) -> Self {
        self.default_vnodes = vnodes;
        self
    }

    /// Add a node using the builder's default virtual node count.
    pub fn add_node(mut self, id: impl Into<NodeId>) -> Self {
        self.nodes.push((id.into(), None));
        self
    }

    /// Add a node with an explicit virtual node count.
    pub fn add_node_with_vnodes(mut self, id: impl Into<NodeId>, vnodes: usize) -> Self {
        self.nodes.push((id.into(), Some(vnodes)));
        self
    }

    pub fn build(self) -> HashRing<P> {
        let ring = HashRing::with_partitioner(self.partitioner);
        for (id, vnodes) in self.nodes {
            ring.add_node(Node::new(id, vnodes.unwrap_or(self.default_vnodes)));
        }
        ring
    }
}
