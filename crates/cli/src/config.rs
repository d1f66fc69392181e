//! CLI configuration.

use crate::commands::{Command, CommandResult};
use clap::Parser;

/// Top-level CLI configuration.
#[derive(Parser, Debug)]
#[command(name = "ringcache", version, about = "Distributed cache cluster driver")]
pub struct CliConfig {
    /// Maximum log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    pub log: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    pub fn run(self) -> CommandResult {
        tracing_subscriber::fmt()
            .with_max_level(self.log)
            .with_target(false)
            .init();
        self.command.execute()
    }
}
