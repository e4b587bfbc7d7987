use clap::Parser;

use sora_node::cli::{describe_nodes, handle_config_action, run_generate, Args, Command};
use sora_node::config::Config;

/// Load .env file
///
/// Loads environment variables from .env file in the working directory.
/// Does not override existing environment variables.
fn load_env() {
    // dotenv::dotenv() returns Err if .env doesn't exist, which is fine
    let _ = dotenv::dotenv();
}

/// Route `log` output to stderr so stdout only carries results.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() {
    load_env();
    init_logging();

    let args = Args::parse();

    let result = match args.command {
        Command::Generate(generate) => Config::load(args.config.as_deref())
            .map_err(|e| e.to_string())
            .and_then(|config| run_generate(&generate, &config)),
        Command::Describe => describe_nodes(),
        Command::Config { action } => handle_config_action(action, args.config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
