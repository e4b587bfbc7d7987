//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{Seconds, Size};

/// Generate videos through a Sora-compatible API
#[derive(Parser, Debug)]
#[command(name = "sora-node")]
#[command(version, about = "Generate videos through a Sora-compatible API", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Four second landscape clip
    sora-node generate \"A cute orange cat chasing a butterfly\"

    # Portrait clip from a reference frame
    sora-node generate \"the cat jumps\" --seconds 8 --size 720x1280 --image cat.png

    # Print the node definition the host registers
    sora-node describe")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a video and print its URL
    Generate(GenerateArgs),
    /// Print the definitions of all exported nodes as JSON
    Describe,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Text prompt describing the video
    pub prompt: String,

    /// Clip duration in seconds
    #[arg(long, default_value = "4")]
    pub seconds: Seconds,

    /// Output resolution
    #[arg(long, default_value = "1280x720")]
    pub size: Size,

    /// Reference image (PNG or JPEG)
    #[arg(long, short)]
    pub image: Option<PathBuf>,

    /// API key (default: $SORA_API_KEY, then config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Model name
    #[arg(long)]
    pub model: Option<String>,

    /// Polling timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Seconds between status checks
    #[arg(long)]
    pub interval: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
