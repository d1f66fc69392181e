//! Replication strategy abstractions.
//!
//! A strategy determines how many copies of a key exist and which nodes hold
//! them. The returned order matters: the first node is the primary replica,
//! the rest are successors consulted in order on reads.

pub mod simple;

pub use simple::SimpleStrategy;

use corelib::node::NodeId;
use corelib::ring::Ring;

/// Trait for replication strategies.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync) as they are shared
/// across threads by the cluster.
pub trait ReplicationStrategy: Send + Sync + 'static {
    /// Number of replicas this strategy places (including the primary).
    fn replication_factor(&self) -> usize;

    /// Replica nodes for a key, primary first.
    ///
    /// Returns fewer than `replication_factor()` nodes when the ring has
    /// fewer live nodes, and an empty list on an empty ring.
    fn replicas_for_key(&self, ring: &Ring, key: &[u8]) -> Vec<NodeId>;

    /// Strategy name (for logging/debugging).
    fn name(&self) -> &'static str;
}
