//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config set`: Set a configuration value
//! - `config path`: Print where the configuration file lives

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::config::{API_URL_ENV, Config};
use crate::error::Result;

/// Show current configuration
pub fn cmd_config_show(output_json: bool) -> Result<()> {
    let config = Config::load()?;
    let path = Config::config_path()?;

    let json_output = json!({
        "api_url": config.api_url,
        "page_size": config.page_size,
        "debounce_ms": config.debounce_ms,
        "clamp_policy": config.clamp_policy.to_string(),
        "request_timeout_secs": config.request_timeout_secs,
        "connect_timeout_secs": config.connect_timeout_secs,
        "config_file": path.to_string_lossy(),
        "config_file_exists": path.exists(),
    });

    let mut text_output = format!("{}\n\n", "Configuration:".cyan().bold());
    for line in config.to_string().lines() {
        match line.split_once(": ") {
            Some((key, value)) => {
                text_output.push_str(&format!("{}: {}\n", key.cyan(), value));
            }
            None => text_output.push_str(&format!("{line}\n")),
        }
    }
    if std::env::var_os(API_URL_ENV).is_some() {
        text_output.push_str(&format!(
            "{}\n",
            format!("(api_url overridden by {API_URL_ENV})").dimmed()
        ));
    }
    text_output.push('\n');
    let location = if path.exists() {
        format!("Config file: {}", path.display())
    } else {
        format!("Config file: {} (not created yet)", path.display())
    };
    text_output.push_str(&location.dimmed().to_string());

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output_json)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output_json: bool) -> Result<()> {
    let mut config = Config::load_file()?;
    config.set(key, value)?;
    let path = config.save()?;

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": value,
        "success": true,
        "config_file": path.to_string_lossy(),
    }))
    .with_text(format!("Set {} = {}", key.cyan(), value))
    .print(output_json)
}

/// Print the configuration file path
pub fn cmd_config_path(output_json: bool) -> Result<()> {
    let path = Config::config_path()?;
    CommandOutput::new(json!({
        "config_file": path.to_string_lossy(),
        "exists": path.exists(),
    }))
    .with_text(path.display().to_string())
    .print(output_json)
}
