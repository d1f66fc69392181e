//! Error types for cluster operations.

/// Errors that can occur while managing cluster membership.
///
/// Data-path operations (put/get/delete) never error; their soft failures
/// are `bool`/`Option` per the storage contract.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// A node with this id is already part of the cluster.
    #[error("node already exists: {0}")]
    DuplicateNode(String),

    /// The referenced node id is not part of the cluster.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// Rejected node configuration (zero capacity or virtual node count).
    #[error("invalid node configuration: {0}")]
    InvalidConfig(String),
}
