//! Virtual node abstractions.
//!
//! Instead of each physical node having a single position on the ring, each
//! node projects multiple positions (virtual nodes). This smooths key
//! distribution and keeps rebalancing gradual: when a node joins or leaves,
//! only the slices adjacent to its virtual nodes move.
//!
//! Typical configuration is 100-200 vnodes per physical node; more vnodes
//! mean better balance at the cost of a larger ring.

use crate::node::NodeId;
use crate::partitioner::Partitioner;
use crate::token::Token;

/// A virtual node on the hash ring.
///
/// A single token position owned by a physical node. Ring entries are exactly
/// these pairs, kept in ascending token order.
///
/// # Invariants
///
/// - Every `VirtualNode` belongs to exactly one physical node
/// - For a node with `v` virtual nodes, entries exist for indices `0..v`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode<T: Token> {
    /// Token position on the ring, derived from `"{node_id}:{index}"`.
    pub token: T,
    /// The physical node that owns this virtual node.
    ///
    /// Many virtual nodes share the same `node_id`; lookups resolve a token
    /// position to this id to route to the physical node.
    pub node_id: NodeId,
}

impl<T: Token> VirtualNode<T> {
    /// Create a virtual node at an explicit token position.
    #[inline]
    pub fn new(token: T, node_id: NodeId) -> Self {
        Self { token, node_id }
    }

    /// Derive the virtual node for `(node_id, index)`.
    ///
    /// The token is the partitioner's hash of `"{node_id}:{index}"`, so the
    /// same node and index always land on the same ring position.
    pub fn for_index<P>(partitioner: &P, node_id: &NodeId, index: usize) -> Self
    where
        P: Partitioner<TokenType = T>,
    {
        let vnode_key = format!("{}:{}", node_id, index);
        let token = partitioner.partition(vnode_key.as_bytes());
        Self::new(token, node_id.clone())
    }

    #[inline]
    pub fn token(&self) -> T {
        self.token
    }

    #[inline]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Clockwise distance to another virtual node.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> T {
        self.token.distance_to(&other.token)
    }
}
