//! CLI tool for driving the distributed cache.
//!
//! Provides commands for:
//! - Running a self-contained cluster demo (load, fail, recover, report)
//! - Inspecting replica placement for a key

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
