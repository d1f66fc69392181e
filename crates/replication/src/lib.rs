//! Replica placement strategies for the cache ring.
//!
//! This crate decides, for a key, which physical nodes hold its copies:
//! - How many replicas to keep
//! - Where to place them on the ring (primary first)
//! - How node availability affects placement

pub mod strategy;

pub use strategy::{ReplicationStrategy, SimpleStrategy};
