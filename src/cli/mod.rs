//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction, GenerateArgs};
pub use commands::{describe_nodes, handle_config_action, run_generate};
pub use enums::{Seconds, Size};
