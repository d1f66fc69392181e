//! Core library for the distributed cache ring.
//!
//! This crate provides the fundamental abstractions for consistent hashing:
//! - Token types and implementations
//! - Partitioner algorithms
//! - Node identity and ring-side metadata
//! - Virtual node abstractions
//! - The hash ring itself

pub mod node;
pub mod partitioner;
pub mod ring;
pub mod token;
pub mod vnode;

pub use node::{Node, NodeId, NodeStatus};
pub use partitioner::Partitioner;
pub use ring::{HashRing, Ring, RingBuilder, DEFAULT_VNODES};
pub use token::Token;
pub use vnode::VirtualNode;
