//! Running counters and reporting snapshots.

use corelib::node::NodeStatus;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Cluster-wide running counters.
///
/// Updated with relaxed atomics; every data-path operation touches these.
#[derive(Debug, Default)]
pub struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
    migrations: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_put(&self) {
        self.puts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_migrations(&self, moved: u64) {
        self.migrations.fetch_add(moved, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn puts(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    pub fn migrations(&self) -> u64 {
        self.migrations.load(Ordering::Relaxed)
    }

    /// Fraction of lookups that found a value, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Per-node load snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct NodeLoad {
    pub size: usize,
    pub capacity: usize,
    pub load_factor: f64,
    pub status: NodeStatus,
}

/// Aggregate cluster snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterStats {
    pub nodes: usize,
    pub total_capacity: usize,
    pub total_size: usize,
    pub utilization: f64,
    pub hit_rate: f64,
    pub puts: u64,
    pub migrations: u64,
    pub replication_factor: usize,
}
