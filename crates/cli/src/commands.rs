//! CLI subcommands.

use clap::Subcommand;
use cluster::DistributedCache;
use corelib::ring::RingBuilder;
use replication::{ReplicationStrategy, SimpleStrategy};
use tracing::info;

/// Result type for command execution.
pub type CommandResult = anyhow::Result<()>;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a cluster, load keys, fail and recover a node, print reports.
    Demo {
        /// Number of nodes in the cluster.
        #[arg(long, default_value_t = 3)]
        nodes: usize,
        /// Per-node capacity (max entries).
        #[arg(long, default_value_t = 1000)]
        capacity: usize,
        /// Virtual nodes per physical node.
        #[arg(long, default_value_t = 128)]
        vnodes: usize,
        /// Replicas per key.
        #[arg(long, default_value_t = 2)]
        replication: usize,
        /// Synthetic keys to load.
        #[arg(long, default_value_t = 500)]
        keys: usize,
    },
    /// Show the replica set for a key on a synthetic ring.
    Placement {
        /// The key to place.
        key: String,
        /// Number of nodes on the ring.
        #[arg(long, default_value_t = 3)]
        nodes: usize,
        /// Virtual nodes per physical node.
        #[arg(long, default_value_t = 128)]
        vnodes: usize,
        /// Replicas per key.
        #[arg(long, default_value_t = 2)]
        replication: usize,
    },
}

impl Command {
    pub fn execute(self) -> CommandResult {
        match self {
            Command::Demo {
                nodes,
                capacity,
                vnodes,
                replication,
                keys,
            } => run_demo(nodes, capacity, vnodes, replication, keys),
            Command::Placement {
                key,
                nodes,
                vnodes,
                replication,
            } => run_placement(&key, nodes, vnodes, replication),
        }
    }
}

fn run_demo(
    nodes: usize,
    capacity: usize,
    vnodes: usize,
    replication: usize,
    keys: usize,
) -> CommandResult {
    let cache: DistributedCache<String> = DistributedCache::new(replication);
    for i in 0..nodes {
        cache.add_node(&format!("node-{}", i), capacity, vnodes)?;
    }

    for i in 0..keys {
        cache.put(&format!("user:{}", i), format!("payload-{}", i));
    }
    for i in 0..keys {
        cache.get(&format!("user:{}", i));
    }

    if nodes > 0 {
        info!("failing node-0 and reading through the replicas");
        cache.simulate_node_failure("node-0");
        for i in 0..keys {
            cache.get(&format!("user:{}", i));
        }
        cache.recover_node("node-0");
    }

    // A late joiner demonstrates bounded rebalancing
    cache.add_node("node-late", capacity, vnodes)?;

    println!("{}", serde_json::to_string_pretty(&cache.statistics())?);
    println!("{}", serde_json::to_string_pretty(&cache.load_distribution())?);
    Ok(())
}

fn run_placement(key: &str, nodes: usize, vnodes: usize, replication: usize) -> CommandResult {
    let mut builder = RingBuilder::new().with_vnodes(vnodes);
    for i in 0..nodes {
        builder = builder.add_node(format!("node-{}", i));
    }
    let ring = builder.build();

    let strategy = SimpleStrategy::new(replication);
    let replicas = strategy.replicas_for_key(&ring, key.as_bytes());
    if replicas.is_empty() {
        println!("{}: no nodes available", key);
        return Ok(());
    }
    for (role, node) in replicas.iter().enumerate() {
        if role == 0 {
            println!("{}: primary   {}", key, node);
        } else {
            println!("{}: replica-{} {}", key, role, node);
        }
    }
    Ok(())
}
