//! Subcommand handlers for generate, describe and config actions.

use std::path::Path;
use std::time::Duration;

use super::args::{ConfigAction, GenerateArgs};
use crate::config::{default_path, Config, DEFAULT_CONFIG_TOML};
use crate::node::{node_class_mappings, HostNode, NodeError, NodeInputs, OutputValue, SoraVideoNode};
use crate::sora::{ImageTensor, SoraError, VideoSeconds, VideoSize, SORA_API_KEY_ENV};

/// Build node inputs from CLI arguments, falling back to the config file.
pub fn build_inputs(args: &GenerateArgs, config: &Config) -> Result<NodeInputs, String> {
    let api_key = args
        .api_key
        .clone()
        .or_else(|| config.resolved_api_key())
        .unwrap_or_default();
    let base_url = args
        .base_url
        .clone()
        .unwrap_or_else(|| config.api.base_url.clone());

    let mut inputs = NodeInputs::new()
        .with_string("api_key", api_key)
        .with_string("prompt", args.prompt.as_str())
        .with_string("seconds", VideoSeconds::from(args.seconds).as_str())
        .with_string("size", VideoSize::from(args.size).as_str())
        .with_string("api_base_url", base_url);

    if let Some(path) = &args.image {
        let image = image::open(path)
            .map_err(|e| format!("Failed to read image '{}': {}", path.display(), e))?;
        log::info!(
            "Loaded reference image {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        inputs = inputs.with_image("image", ImageTensor::from_image(&image));
    }

    Ok(inputs)
}

/// Build the node with config values overridden by CLI flags.
///
/// A zero `--interval` is rejected.
pub fn build_node(args: &GenerateArgs, config: &Config) -> Result<SoraVideoNode, String> {
    let model = args.model.clone().unwrap_or_else(|| config.api.model.clone());

    let mut poll = config.poll.options();
    if let Some(secs) = args.timeout {
        poll.timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.interval {
        poll.interval = Duration::from_secs(secs);
    }
    poll.validate().map_err(|e| format!("{}; --interval must be at least 1 second", e))?;

    Ok(SoraVideoNode::new(model, poll))
}

/// Run the generate command and print the resulting video URL.
pub fn run_generate(args: &GenerateArgs, config: &Config) -> Result<(), String> {
    let inputs = build_inputs(args, config)?;
    let node = build_node(args, config)?;

    let outputs = node.execute(&inputs).map_err(|e| match e {
        NodeError::Sora(SoraError::MissingApiKey | SoraError::PlaceholderApiKey) => format!(
            "{}.\n\n\
            Pass --api-key, add it to a .env file:\n\
                echo '{env}=your-api-key-here' >> .env\n\n\
            or set it as an environment variable:\n\
                export {env}=\"your-api-key-here\"",
            e,
            env = SORA_API_KEY_ENV
        ),
        other => other.to_string(),
    })?;

    for output in outputs {
        match output {
            OutputValue::String(url) => println!("{}", url),
        }
    }

    Ok(())
}

/// Print every exported node definition as pretty JSON.
pub fn describe_nodes() -> Result<(), String> {
    let definitions: Vec<_> = node_class_mappings()
        .values()
        .map(|node| node.definition())
        .collect();

    let json = serde_json::to_string_pretty(&definitions)
        .map_err(|e| format!("Failed to serialize node definitions: {}", e))?;
    println!("{}", json);
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config_path: Option<&Path>) -> Result<(), String> {
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(&path)).map_err(|e| e.to_string())?;
            let options = config.poll.options();

            println!("Current configuration:");
            println!("  Base URL: {}", config.api.base_url);
            println!("  Model: {}", config.api.model);
            println!(
                "  API key: {}",
                if config.resolved_api_key().is_some() {
                    "set"
                } else {
                    "not set"
                }
            );
            println!("  Poll timeout: {:?}", options.timeout);
            println!("  Poll interval: {:?}", options.interval);
            println!();

            if path.exists() {
                println!("Config file: {} (exists)", path.display());
            } else {
                println!("Config file: {} (not found)", path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'sora-node config show' to view current settings.",
                    path.display()
                ));
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating config directory: {}", e))?;
            }

            std::fs::write(&path, DEFAULT_CONFIG_TOML)
                .map_err(|e| format!("Error writing config file: {}", e))?;

            println!("Created config file: {}", path.display());
            Ok(())
        }
    }
}
