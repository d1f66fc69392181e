//! Node identity and ring-side metadata.
//!
//! Nodes represent physical participants in the ring. They are identified by
//! an opaque `NodeId` chosen by the caller; the id is cheap to clone, compare,
//! and hash.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque identifier for a node in the cluster.
///
/// Newtype over `Arc<str>` so cloning is a pointer bump while the id itself
/// stays caller-chosen (a hostname, a UUID, anything unique).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(Arc<str>);

impl NodeId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId::new(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Availability of a node as seen by replica selection.
///
/// `Down` nodes keep their ring entries and their stored data; they are only
/// excluded while enumerating replicas, so recovery is a status flip.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Up,
    Down,
}

impl NodeStatus {
    pub fn is_up(&self) -> bool {
        matches!(self, NodeStatus::Up)
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Up => f.write_str("active"),
            NodeStatus::Down => f.write_str("inactive"),
        }
    }
}

/// Ring-side record of a physical node.
///
/// Keep this struct small and cheap to clone; heavy mutable state (the actual
/// key/value storage, capacity accounting) lives in the storage crate.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    /// Number of virtual nodes this node projects onto the ring.
    pub vnodes: usize,
    /// Availability flag consulted by replica selection.
    pub status: NodeStatus,
}

impl Node {
    /// Construct a new node record, initially `Up`.
    pub fn new(id: impl Into<NodeId>, vnodes: usize) -> Self {
        Self {
            id: id.into(),
            vnodes,
            status: NodeStatus::Up,
        }
    }

    pub fn is_up(&self) -> bool {
        self.status.is_up()
    }
}
