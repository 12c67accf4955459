//! Configuration loading from file system
//!
//! Handles loading and parsing the config.json file.

use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use super::defaults::DEFAULT_CONFIG_PATH;
use super::types::Config;
use crate::error::{FeedbackError, Result};

/// Load configuration from ~/.interactive-feedback/config.json
///
/// Returns Config::default() if the file is missing or invalid.
pub fn load_config() -> Config {
    let config_path = PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref());
    load_config_from(&config_path)
}

/// Load configuration from an explicit path.
///
/// A missing file yields defaults silently; an unreadable or malformed file
/// logs a warning (with a hint where one helps) and yields defaults.
#[instrument(name = "load_config", fields(path = %config_path.display()))]
pub fn load_config_from(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    let contents = match std::fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(error = %e, "Failed to read config file, using defaults");
            return Config::default();
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            info!(path = %config_path.display(), "Successfully loaded config");
            config
        }
        Err(e) => {
            let message = e.to_string();
            // Provide helpful error message for common config mistakes
            let error_hint = if message.contains("invalid type") || message.contains("invalid value")
            {
                "\n\nHint: 'fontSize' must be a positive whole number, 'offerCommit' a boolean, \
                and 'dialogPath'/'tempDir' strings"
            } else if message.contains("expected value") || message.contains("expected `,`") {
                "\n\nHint: config.json must be a JSON object. Example:\n\
                {\n\
                  \"fontSize\": 14,\n\
                  \"offerCommit\": true\n\
                }"
            } else {
                ""
            };

            warn!(
                error = %message,
                hint = %error_hint,
                "Failed to parse config JSON, using defaults"
            );
            Config::default()
        }
    }
}

/// Parse config JSON text. Empty input is treated as an empty object.
pub fn parse_config(contents: &str) -> Result<Config> {
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Ok(Config::default());
    }
    serde_json::from_str::<Config>(trimmed).map_err(|e| FeedbackError::Config(e.to_string()))
}
