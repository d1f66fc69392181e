//! Bounded per-node key/value storage.
//!
//! A [`CacheNode`] is the unit of physical storage behind the ring: a
//! capacity-bounded map with its own lock, so operations on different nodes
//! proceed in parallel.

pub mod node;

pub use node::CacheNode;
