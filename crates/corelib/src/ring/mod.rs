//! Consistent hash ring implementation.
//!
//! The ring manages token positions and provides efficient lookup
//! operations for finding the nodes responsible for keys.

pub mod ring;

pub use ring::{HashRing, RingBuilder, DEFAULT_VNODES};

/// Alias for the ring with the default partitioner (used by lib.rs).
pub type Ring = HashRing;
